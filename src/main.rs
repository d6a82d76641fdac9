//! todo: a task list that pays points you can spend on rewards.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use todo_rewards::config::Config;
use todo_rewards::render;
use todo_rewards::settlement::Settlement;
use todo_rewards::tracker::{AssumeYes, Confirm, Destructive, Outcome, Tracker};

#[derive(Parser)]
#[command(name = "todo", version, about = "A todo list for the terminal, with rewards")]
struct Cli {
    /// Config file (created with defaults if missing).
    #[arg(long, global = true, default_value = Config::FILE_NAME)]
    config: PathBuf,

    /// Task file, overriding the config.
    #[arg(long, global = true)]
    todo_file: Option<PathBuf>,

    /// Reward file, overriding the config.
    #[arg(long, global = true)]
    reward_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task.
    Add {
        /// Task text.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Points received after completing the task.
        #[arg(short, long)]
        points: Option<u32>,
    },

    /// Show all tasks.
    List {
        /// Also show the points for each task.
        #[arg(short, long)]
        points: bool,
    },

    /// Mark a task as completed and receive its points.
    Complete {
        id: String,
        /// Delete the task after completion.
        #[arg(short, long)]
        delete: bool,
        /// Delete without confirmation.
        #[arg(short, long, requires = "delete")]
        force: bool,
    },

    /// Mark a task as not completed and give its points back.
    NotComplete { id: String },

    /// Edit the text of a task.
    Edit {
        id: String,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Change the points of a task.
    Points { id: String, points: u32 },

    /// Delete a task (it can be restored with `cancel-delete`).
    Delete {
        id: String,
        /// Delete without confirmation.
        #[arg(short, long)]
        force: bool,
    },

    /// Restore the last deleted task as not completed, with a new id.
    CancelDelete,

    /// Remove all tasks.
    Clear {
        /// Clear without confirmation.
        #[arg(short, long)]
        force: bool,
    },

    /// Manage rewards and the points balance.
    Reward {
        #[command(subcommand)]
        action: RewardAction,
    },

    /// Show or change default points and price.
    Defaults {
        #[command(subcommand)]
        action: DefaultsAction,
    },
}

#[derive(Subcommand)]
enum RewardAction {
    /// Add a new reward.
    Add {
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
        /// Price in points.
        #[arg(short, long)]
        price: Option<u32>,
    },
    /// Show the balance and all rewards.
    List,
    /// Buy a reward if the balance covers its price.
    Buy { id: String },
    /// Edit the description of a reward.
    Describe {
        id: String,
        #[arg(required = true, num_args = 1..)]
        description: Vec<String>,
    },
    /// Change the price of a reward.
    Price { id: String, price: u32 },
    /// Delete a reward permanently.
    Delete {
        id: String,
        #[arg(short, long)]
        force: bool,
    },
    /// Remove all rewards.
    Clear {
        #[arg(short, long)]
        force: bool,
    },
    /// Set the balance to zero.
    ResetPoints {
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum DefaultsAction {
    /// Print the effective configuration.
    Show,
    /// Set the default points for new tasks.
    Points { points: u32 },
    /// Set the default price for new rewards.
    Price { price: u32 },
}

/// Asks on stdin; only `y` proceeds.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, action: &Destructive<'_>) -> bool {
        print!("{}", render::destructive_prompt(action));
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => answer.trim().eq_ignore_ascii_case("y"),
            Err(_) => false,
        }
    }
}

fn confirmer(force: bool) -> Box<dyn Confirm> {
    if force {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinConfirm)
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let file_config = Config::load_or_init(&cli.config)?;
    let mut config = file_config.clone().with_env()?;
    if let Some(path) = cli.todo_file {
        config.storage.todo_file = path;
    }
    if let Some(path) = cli.reward_file {
        config.storage.reward_file = path;
    }
    let tracker = Tracker::new(config);

    match cli.command {
        Commands::Add { text, points } => {
            let task = tracker.add_task(&text.join(" "), points)?;
            println!(
                "Added task: {} ({} points)",
                render::task_line(&task),
                task.task_points
            );
        }

        Commands::List { points } => {
            let ledger = tracker.tasks()?;
            print!("{}", render::task_table(ledger.tasks(), points));
        }

        Commands::Complete { id, delete, force } => {
            let done = tracker.complete_task(&id)?;
            print_settlement(done.settlement, done.balance);

            if delete {
                let mut confirm = confirmer(force);
                match tracker.delete_task(&id, confirm.as_mut())? {
                    Outcome::Done(task) => {
                        println!("Well done! Task {} has been completed and deleted!", task.id);
                    }
                    Outcome::Cancelled => {
                        println!("The deletion was cancelled!");
                        println!("Well done! Task {} was marked as completed!", done.task.id);
                    }
                }
            } else {
                println!("Well done! Task {} was marked as completed!", done.task.id);
                println!("{}", render::task_line(&done.task));
            }
        }

        Commands::NotComplete { id } => {
            let undone = tracker.uncomplete_task(&id)?;
            print_settlement(undone.settlement, undone.balance);
            println!("Now task {} is not completed!", undone.task.id);
            println!("{}", render::task_line(&undone.task));
        }

        Commands::Edit { id, text } => {
            let task = tracker.edit_task_text(&id, &text.join(" "))?;
            println!("Task is changed: {}", render::task_line(&task));
        }

        Commands::Points { id, points } => {
            let task = tracker.edit_task_points(&id, points)?;
            println!(
                "Count of points has been changed for task {}: {} ({} points)",
                task.id, task.text, task.task_points
            );
        }

        Commands::Delete { id, force } => {
            let mut confirm = confirmer(force);
            match tracker.delete_task(&id, confirm.as_mut())? {
                Outcome::Done(task) => println!("Task {} was deleted!", task.id),
                Outcome::Cancelled => println!("The deletion was cancelled!"),
            }
        }

        Commands::CancelDelete => {
            let task = tracker.restore_task()?;
            println!("The task was restored with NEW ID: {}", render::task_line(&task));
        }

        Commands::Clear { force } => {
            let mut confirm = confirmer(force);
            match tracker.clear_tasks(confirm.as_mut())? {
                Outcome::Done(_) => println!("All tasks have been removed!"),
                Outcome::Cancelled => println!("Operation was cancelled!"),
            }
        }

        Commands::Reward { action } => run_reward(&tracker, action)?,

        Commands::Defaults { action } => match action {
            DefaultsAction::Show => {
                let text = toml::to_string_pretty(tracker.config()).into_diagnostic()?;
                print!("{text}");
            }
            DefaultsAction::Points { points } => {
                let mut updated = file_config;
                updated.defaults.task_points = points;
                updated.save(&cli.config)?;
                println!("Count of points by default has been changed: {points}");
            }
            DefaultsAction::Price { price } => {
                let mut updated = file_config;
                updated.defaults.reward_price = price;
                updated.save(&cli.config)?;
                println!("Price of reward by default has been changed: {price}");
            }
        },
    }

    Ok(())
}

fn run_reward(tracker: &Tracker, action: RewardAction) -> Result<()> {
    match action {
        RewardAction::Add { description, price } => {
            let reward = tracker.add_reward(&description.join(" "), price)?;
            println!("Added reward: {}", render::reward_line(&reward));
        }
        RewardAction::List => {
            let ledger = tracker.rewards()?;
            print!("{}", render::reward_table(&ledger));
        }
        RewardAction::Buy { id } => {
            let purchase = tracker.buy_reward(&id)?;
            println!("Good Job! Here is your reward! Enjoy!");
            println!("Receive reward: {}", purchase.reward.description);
            println!("Now your balance: {}", purchase.balance);
        }
        RewardAction::Describe { id, description } => {
            let reward = tracker.edit_reward_description(&id, &description.join(" "))?;
            println!("Description of reward has been changed: {}", render::reward_line(&reward));
        }
        RewardAction::Price { id, price } => {
            let reward = tracker.edit_reward_price(&id, price)?;
            println!("Price of reward has been changed: {}", render::reward_line(&reward));
        }
        RewardAction::Delete { id, force } => {
            let mut confirm = confirmer(force);
            match tracker.delete_reward(&id, confirm.as_mut())? {
                Outcome::Done(reward) => println!("Reward {} was deleted!", reward.id),
                Outcome::Cancelled => println!("The deletion was cancelled!"),
            }
        }
        RewardAction::Clear { force } => {
            let mut confirm = confirmer(force);
            match tracker.clear_rewards(confirm.as_mut())? {
                Outcome::Done(_) => println!("All rewards have been removed!"),
                Outcome::Cancelled => println!("Operation was cancelled!"),
            }
        }
        RewardAction::ResetPoints { force } => {
            let mut confirm = confirmer(force);
            match tracker.reset_points(confirm.as_mut())? {
                Outcome::Done(previous) => {
                    println!("Your balance has been reset (was {previous} points).")
                }
                Outcome::Cancelled => println!("Operation was cancelled!"),
            }
        }
    }
    Ok(())
}

fn print_settlement(settlement: Settlement, balance: i64) {
    match settlement {
        Settlement::Credited(0) | Settlement::Debited(0) | Settlement::Unchanged => {}
        Settlement::Credited(points) => {
            println!("You received {points} points. Balance: {balance}");
        }
        Settlement::Debited(points) => {
            println!("{points} points were taken back. Balance: {balance}");
        }
    }
}
