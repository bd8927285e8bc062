//! src/main.rs
//! Line-driven front end for the explorer session: one input line per tick,
//! every confirmed request goes through `SessionManager::dispatch`.

use std::{
    io::{self, BufRead, StdinLock, Write},
    panic::PanicHookInfo,
    path::PathBuf,
};

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use fex_core::{
    Config, Logger, SessionManager,
    controller::actions::{
        Command, ExitChoice, ExitDecision, ExitStatus, Outcome, PendingChoice, Preview,
        SaveOutcome, Target, Transition,
    },
    fs::{dir_scanner, object_info::DirectoryEntry},
    model::file_kind::{self, FileKind},
};

const HELP: &str = "\
commands:
  open <dir>            open a folder
  cd <name> | up        enter a child folder / go to the parent
  ls                    list the current folder
  select <file>         select a file, relative to the current folder
  show                  print the loaded buffer or the preview state
  edit <text>           replace the buffer with <text>
  append <text>         append a line to the buffer
  save                  write the buffer to disk
  new <name>            create an empty file and open it
  mkdir <name>          create a folder and enter it
  rename file|dir <to>  rename the selection or the current folder
  delete file|dir       delete the selection or the current folder
  preview               decode the selected image
  exit                  quit";

fn main() -> Result<()> {
    setup_panic_handler();

    let config: Config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {e:#}");
        Config::default()
    });

    let _guard: WorkerGuard =
        Logger::init_tracing(&config.logging).context("Failed to initialize logging")?;
    info!("Starting fex");

    let mut app = App::new(&config);
    app.run().context("Session terminated abnormally")?;

    info!("fex exited cleanly");
    Ok(())
}

/// What one input line asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Dispatch(Command),
    List,
    Show,
    Append(String),
    Help,
    Blank,
}

struct App {
    manager: SessionManager,
    lines: io::Lines<StdinLock<'static>>,
}

impl App {
    fn new(config: &Config) -> Self {
        let mut manager = SessionManager::new(config);

        if let Some(dir) = &config.start_directory {
            if let Err(e) = manager.dispatch(Command::OpenDirectory(dir.clone())) {
                warn!(error = %e, "Start directory could not be opened");
                println!("{e}");
            }
        }

        Self {
            manager,
            lines: io::stdin().lock().lines(),
        }
    }

    fn run(&mut self) -> Result<()> {
        println!("fex: type `help` for commands");

        loop {
            let Some(line) = self.prompt()? else {
                // stdin closed: behave like `exit` followed by "discard"
                self.manager.shutdown();
                return Ok(());
            };

            let input = match parse_line(&line) {
                Ok(input) => input,
                Err(msg) => {
                    println!("{msg}");
                    continue;
                }
            };

            match input {
                Input::Blank => {}

                Input::Help => print_help(),

                Input::List => self.print_listing(),

                Input::Show => self.print_selection(),

                Input::Append(text) => {
                    let Some(current) = self.manager.session().content() else {
                        println!("No text file is loaded");
                        continue;
                    };

                    let mut bytes: Vec<u8> = current.to_vec();
                    if !bytes.is_empty() && !bytes.ends_with(b"\n") {
                        bytes.push(b'\n');
                    }
                    bytes.extend_from_slice(text.as_bytes());
                    bytes.push(b'\n');

                    self.execute(Command::EditContent(bytes))?;
                }

                Input::Dispatch(Command::RequestExit) => {
                    if self.exit()? {
                        return Ok(());
                    }
                }

                Input::Dispatch(command) => self.execute(command)?,
            }
        }
    }

    fn prompt(&mut self) -> Result<Option<String>> {
        let title: String = self.manager.session().title().unwrap_or_default();
        let dir: String = self
            .manager
            .session()
            .current_directory()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|| "(no folder)".to_string());

        print!("{dir} {title}> ");
        io::stdout().flush().context("Failed to flush stdout")?;

        self.lines
            .next()
            .transpose()
            .context("Failed to read stdin")
    }

    fn execute(&mut self, command: Command) -> Result<()> {
        match self.manager.dispatch(command) {
            Ok(Outcome::Transition(Transition::ConfirmationRequired)) => self.confirm_pending(),

            Ok(outcome) => {
                report(&outcome);
                Ok(())
            }

            Err(e) => {
                println!("error: {e}");
                Ok(())
            }
        }
    }

    /// Asks whether to save before the deferred open, then resolves it.
    fn confirm_pending(&mut self) -> Result<()> {
        let target: PathBuf = match self.manager.session().pending_target() {
            Some(target) => target.path().to_path_buf(),
            None => return Ok(()),
        };

        println!(
            "Unsaved changes. Save before opening {}? [save/discard/cancel]",
            target.display()
        );

        let choice: PendingChoice = loop {
            let Some(answer) = self.prompt()? else {
                break PendingChoice::Cancel;
            };

            match answer.trim() {
                "save" | "s" => break PendingChoice::Save,
                "discard" | "d" => break PendingChoice::Discard,
                "cancel" | "c" | "" => break PendingChoice::Cancel,
                _ => println!("answer save, discard or cancel"),
            }
        };

        self.execute(Command::ResolvePendingOpen(choice))
    }

    /// Returns true when the session may end.
    fn exit(&mut self) -> Result<bool> {
        let choice: ExitChoice = match self.manager.request_exit() {
            ExitStatus::ReadyToExit => ExitChoice::DiscardAndExit,

            ExitStatus::NeedsConfirmation => {
                println!("Save changes before exiting? [save/discard/cancel]");

                loop {
                    let Some(answer) = self.prompt()? else {
                        break ExitChoice::DiscardAndExit;
                    };

                    match answer.trim() {
                        "save" | "s" => break ExitChoice::Save,
                        "discard" | "d" => break ExitChoice::DiscardAndExit,
                        "cancel" | "c" | "" => break ExitChoice::Cancel,
                        _ => println!("answer save, discard or cancel"),
                    }
                }
            }
        };

        match self.manager.dispatch(Command::ResolveExit(choice)) {
            Ok(Outcome::ExitDecision(ExitDecision::Exit)) => Ok(true),

            Ok(_) => Ok(false),

            Err(e) => {
                println!("error: {e}");
                Ok(false)
            }
        }
    }

    fn print_listing(&self) {
        let mut entries: Vec<DirectoryEntry> = self.manager.list_current();

        if entries.is_empty() && self.manager.session().current_directory().is_none() {
            println!("No folder opened");
            return;
        }

        dir_scanner::sort_entries(&mut entries);
        for entry in &entries {
            println!("  {}", entry.label());
        }
    }

    fn print_selection(&self) {
        let session = self.manager.session();

        match self.manager.preview() {
            Preview::Nothing => println!("Nothing selected"),

            Preview::Text => {
                if let Some(syntax) = self.manager.syntax() {
                    println!("-- {} ({}) --", session.title().unwrap_or_default(), syntax.name());
                }
                println!("{}", String::from_utf8_lossy(session.content().unwrap_or_default()));
            }

            other => report(&Outcome::Preview(other)),
        }
    }
}

fn print_help() {
    println!("{HELP}");

    for kind in [FileKind::Text, FileKind::Image] {
        let extensions: Vec<&str> = file_kind::extensions_of(kind).collect();
        println!("{kind} files: {}", extensions.join(" "));
    }
}

fn report(outcome: &Outcome) {
    match outcome {
        Outcome::Transition(_) | Outcome::Edited { .. } => {}

        Outcome::Saved(SaveOutcome::Saved) => println!("Saved"),

        Outcome::Saved(_) => println!("Nothing to save"),

        Outcome::Renamed(path) => println!("Renamed to {}", path.display()),

        Outcome::Deleted => println!("Deleted"),

        Outcome::Preview(Preview::Image { width, height }) => {
            println!("Image {width}x{height}");
        }

        Outcome::Preview(Preview::Unsupported { reason }) => match reason {
            Some(reason) => println!("File format not supported for preview ({reason})"),
            None => println!("File format not supported for preview"),
        },

        Outcome::Preview(Preview::PendingImage) => println!("Image not decoded, use `preview`"),

        Outcome::Preview(_) | Outcome::Exit(_) | Outcome::ExitDecision(_) => {}
    }
}

fn parse_line(line: &str) -> Result<Input, String> {
    let line: &str = line.trim();
    let (word, rest): (&str, &str) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(w, r)| (w, r.trim()));

    let need = |what: &str| -> Result<String, String> {
        if rest.is_empty() {
            Err(format!("`{word}` needs {what}"))
        } else {
            Ok(rest.to_string())
        }
    };

    let target = |arg: &str| -> Result<Target, String> {
        match arg {
            "file" => Ok(Target::SelectedEntry),
            "dir" | "folder" => Ok(Target::CurrentDirectory),
            other => Err(format!("unknown target `{other}`, use file or dir")),
        }
    };

    let input = match word {
        "" => Input::Blank,
        "help" | "?" => Input::Help,
        "ls" => Input::List,
        "show" => Input::Show,
        "open" => Input::Dispatch(Command::OpenDirectory(PathBuf::from(need("a folder")?))),
        "cd" => Input::Dispatch(Command::NavigateInto(need("a folder name")?)),
        "up" | ".." => Input::Dispatch(Command::NavigateUp),
        "select" => Input::Dispatch(Command::SelectFile(PathBuf::from(need("a file")?))),
        "edit" => Input::Dispatch(Command::EditContent(need("text")?.into_bytes())),
        "append" => Input::Append(rest.to_string()),
        "save" => Input::Dispatch(Command::Save),
        "new" => Input::Dispatch(Command::CreateFile(need("a name")?)),
        "mkdir" => Input::Dispatch(Command::CreateFolder(need("a name")?)),
        "rename" => {
            let (which, new_name): (&str, &str) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: rename file|dir <new name>".to_string())?;

            Input::Dispatch(Command::Rename {
                target: target(which)?,
                new_name: new_name.trim().to_string(),
            })
        }
        "delete" | "rm" => Input::Dispatch(Command::Delete(target(&need("file or dir")?)?)),
        "preview" => Input::Dispatch(Command::LoadImagePreview),
        "exit" | "quit" | "q" => Input::Dispatch(Command::RequestExit),
        other => return Err(format!("unknown command `{other}`, try `help`")),
    };

    Ok(input)
}

fn setup_panic_handler() {
    let original_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info: &PanicHookInfo<'_>| {
        error!("Application panicked: {}", panic_info);
        original_hook(panic_info);
    }));
}
