//! CLI module for the dailydo application
//!
//! This module handles the command-line interface for interacting with the
//! application context.
use std::{
    fs,
    io::{stdin, stdout, Write},
    path::PathBuf,
    sync::Arc,
};

use console::style;
use log::{debug, info};
use tokio::sync::Mutex;

use crate::{
    render_active, render_done, render_html, render_routines, sanitize_for_terminal, AppContext,
    Commands, Config, ResetOutcome, ResetScheduler, Result, RoutineCommands, TodoError,
};

/// CLI Application handler - processes CLI commands and interfaces with the
/// application context
pub struct App {
    /// Shared application state
    context: Arc<Mutex<AppContext>>,

    /// Application configuration
    config: Config,

    /// Where `config --set` and `config --reset` write to
    config_path: Option<PathBuf>,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    pub fn new(
        context: Arc<Mutex<AppContext>>,
        config: Config,
        config_path: Option<PathBuf>,
        verbose: bool,
    ) -> Self {
        Self {
            context,
            config,
            config_path,
            verbose,
        }
    }

    /// Run the CLI application with the given command
    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Add { text } => self.handle_add(text).await?,
            Commands::Done { id } => self.handle_toggle(id).await?,
            Commands::Delete { id, force } => self.handle_delete(id, force).await?,
            Commands::List { tab, json } => self.handle_list(&tab, json).await?,
            Commands::Routine { command } => self.handle_routine(command).await?,
            Commands::Reset { force } => self.handle_reset(force).await?,
            Commands::Watch => self.handle_watch().await?,
            Commands::Export { output, format } => self.handle_export(output, &format).await?,
            Commands::Config { show, set, reset } => self.handle_config(show, set, reset)?,
            Commands::Clear { force } => self.handle_clear(force).await?,
        }

        Ok(())
    }

    async fn handle_add(&self, text: String) -> Result<()> {
        let id = self.context.lock().await.add_todo(&text)?;
        println!("Task added with ID: {}", id);
        Ok(())
    }

    async fn handle_toggle(&self, id: i64) -> Result<()> {
        match self.context.lock().await.toggle_todo(id)? {
            Some(item) if item.done => println!(
                "Done: {} ({})",
                sanitize_for_terminal(&item.text),
                item.done_time.as_deref().unwrap_or("")
            ),
            Some(item) => println!("Back to active: {}", sanitize_for_terminal(&item.text)),
            None => println!("No task with ID {}", id),
        }
        Ok(())
    }

    async fn handle_delete(&self, id: i64, force: bool) -> Result<()> {
        let mut context = self.context.lock().await;

        let Some(item) = context.todo(id).cloned() else {
            println!("No task with ID {}", id);
            return Ok(());
        };

        if !force {
            println!("You are about to delete the following task:");
            println!("ID:    {}", item.id);
            println!("Text:  {}", sanitize_for_terminal(&item.text));
            if !confirm("Are you sure you want to delete this task?")? {
                println!("Deletion cancelled.");
                return Ok(());
            }
        }

        context.delete_todo(id)?;
        println!("Task {} has been deleted.", id);
        Ok(())
    }

    async fn handle_list(&self, tab: &str, json: bool) -> Result<()> {
        let context = self.context.lock().await;
        let active = context.active_todos();
        let done = context.done_todos();

        if json {
            let value = match tab {
                "active" => serde_json::to_value(&active)?,
                "done" => serde_json::to_value(&done)?,
                _ => serde_json::to_value(context.todos())?,
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
            return Ok(());
        }

        match tab {
            "active" => print!("{}", render_active(&active)),
            "done" => print!("{}", render_done(&done)),
            _ => {
                println!("{}", style("Active").bold());
                print!("{}", render_active(&active));
                println!("{}", separator());
                println!("{}", style("Done").bold());
                print!("{}", render_done(&done));
            }
        }

        if self.verbose {
            println!(
                "\n{} active, {} done",
                active.len(),
                done.len()
            );
        }
        Ok(())
    }

    async fn handle_routine(&self, command: RoutineCommands) -> Result<()> {
        let mut context = self.context.lock().await;

        match command {
            RoutineCommands::Add { text } => {
                let id = context.add_routine(&text)?;
                println!("Routine added with ID: {}", id);
            }
            RoutineCommands::Check { id } => match context.toggle_routine(id)? {
                Some(item) => println!(
                    "{} {}",
                    if item.checked { "Checked:" } else { "Unchecked:" },
                    sanitize_for_terminal(&item.text)
                ),
                None => println!("No routine with ID {}", id),
            },
            RoutineCommands::Delete { id } => match context.delete_routine(id)? {
                Some(_) => println!("Routine {} has been deleted.", id),
                None => println!("No routine with ID {}", id),
            },
            RoutineCommands::List { json } => {
                if json {
                    println!("{}", serde_json::to_string_pretty(context.routines())?);
                } else {
                    let last_reset = context.last_reset()?;
                    print!(
                        "{}",
                        render_routines(context.routines(), last_reset.as_deref())
                    );
                }
            }
        }

        Ok(())
    }

    async fn handle_reset(&self, force: bool) -> Result<()> {
        let mut context = self.context.lock().await;
        let outcome = if force {
            context.force_reset()?
        } else {
            context.run_daily_reset()?
        };
        println!("{}", describe_outcome(&outcome, self.config.cutoff_hour));
        Ok(())
    }

    async fn handle_watch(&self) -> Result<()> {
        let mut scheduler = ResetScheduler::new(self.config.reset_interval());
        scheduler.set_context(Arc::clone(&self.context));
        scheduler.start().await?;

        let outcome = scheduler.check_now().await?;
        println!("{}", describe_outcome(&outcome, self.config.cutoff_hour));
        println!(
            "Watching for the daily reset every {}s. Press Ctrl-C to stop.",
            self.config.reset_interval_secs
        );

        tokio::signal::ctrl_c().await?;
        info!("Interrupt received");

        let status = scheduler.get_status()?;
        debug!("Scheduler status before stop: {:?}", status);
        scheduler.stop().await
    }

    async fn handle_export(&self, output: PathBuf, format: &str) -> Result<()> {
        let context = self.context.lock().await;
        let last_reset = context.last_reset()?;

        let content = match format {
            "json" => serde_json::to_string_pretty(&serde_json::json!({
                "todos": context.todos(),
                "routines": context.routines(),
                "lastRoutineReset": last_reset,
            }))?,
            _ => render_html(
                &context.active_todos(),
                &context.done_todos(),
                context.routines(),
                last_reset.as_deref(),
            ),
        };

        fs::write(&output, content)?;
        println!("Exported to {}", output.display());
        Ok(())
    }

    fn handle_config(&self, show: bool, set: Option<String>, reset: bool) -> Result<()> {
        if reset {
            let path = self.require_config_path()?;
            Config::default().save(&path)?;
            println!("Configuration reset to defaults.");
            return Ok(());
        }

        if let Some(assignment) = set {
            let path = self.require_config_path()?;
            let mut config = Config::load_or_default(&path)?;
            config.set_value(&assignment)?;
            config.save(&path)?;
            println!("Configuration updated.");
            return Ok(());
        }

        if show || self.verbose {
            println!("{}", serde_json::to_string_pretty(&self.config)?);
            if let Some(path) = &self.config_path {
                println!("{}", style(format!("Loaded from {}", path.display())).dim());
            }
        } else {
            println!("Use --show, --set key=value or --reset.");
        }
        Ok(())
    }

    async fn handle_clear(&self, force: bool) -> Result<()> {
        if !force && !confirm("This removes every task and routine. Continue?")? {
            println!("Clear cancelled.");
            return Ok(());
        }

        let removed = self.context.lock().await.clear_all()?;
        println!("Removed {} stored keys.", removed);
        Ok(())
    }

    fn require_config_path(&self) -> Result<PathBuf> {
        self.config_path.clone().ok_or_else(|| TodoError::ConfigError {
            message: "No configuration path available; pass --config".to_string(),
        })
    }
}

fn describe_outcome(outcome: &ResetOutcome, cutoff_hour: u32) -> String {
    match outcome {
        ResetOutcome::Reset { cleared, date } => {
            format!("Routines reset for {} ({} unchecked).", date, cleared)
        }
        ResetOutcome::BeforeCutoff => {
            format!("Too early: routines reset after {}:00.", cutoff_hour)
        }
        ResetOutcome::AlreadyReset => "Routines were already reset today.".to_string(),
    }
}

fn separator() -> String {
    let term_width = terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80);
    "-".repeat(term_width.min(50))
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N]: ", prompt);
    stdout().flush().map_err(TodoError::Io)?;

    let mut input = String::new();
    stdin().read_line(&mut input).map_err(TodoError::Io)?;

    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
