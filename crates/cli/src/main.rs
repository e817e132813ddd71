use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use finch_agents::{FinanceAdvisor, APOLOGY_MESSAGE, DISCLAIMER, GREETING};
use finch_core::{
    classify_intent, quick_tips, Category, KnowledgeBase, UserProfile, UserType, KNOWN_GOALS,
};
use finch_observability::{init_tracing, AppMetrics};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "finch")]
#[command(about = "Finch personal finance advisor CLI")]
struct Cli {
    /// JSON knowledge base replacing the builtin advice.
    #[arg(long, env = "FINCH_KNOWLEDGE_BASE")]
    knowledge_base: Option<PathBuf>,

    /// Seed for reproducible advice selection.
    #[arg(long, env = "FINCH_SEED")]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct ProfileArgs {
    #[arg(long, env = "FINCH_USER_TYPE", default_value = "student")]
    user_type: String,
    #[arg(long, env = "FINCH_AGE", default_value_t = 25, allow_negative_numbers = true)]
    age: i32,
    /// Monthly income; 0 leaves it unspecified.
    #[arg(long, env = "FINCH_INCOME", default_value_t = 0.0, allow_negative_numbers = true)]
    income: f64,
    /// Repeat for several goals; order is kept.
    #[arg(long = "goal")]
    goals: Vec<String>,
}

impl ProfileArgs {
    fn to_profile(&self) -> UserProfile {
        for goal in &self.goals {
            if !KNOWN_GOALS.contains(&goal.as_str()) {
                warn!(goal = %goal, "goal is not one of the known goals");
            }
        }

        UserProfile::new(
            UserType::parse(&self.user_type),
            self.age,
            self.income,
            self.goals.clone(),
        )
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    Chat {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    Ask {
        message: String,
        #[command(flatten)]
        profile: ProfileArgs,
        /// Print the reply with its route as JSON.
        #[arg(long)]
        json: bool,
    },
    Classify {
        message: String,
    },
    Tips {
        #[arg(long, default_value = "student")]
        user_type: String,
    },
    Kb {
        #[command(subcommand)]
        command: KbCommand,
    },
}

#[derive(Debug, Subcommand)]
enum KbCommand {
    Show {
        category: String,
        #[arg(long)]
        key: Option<String>,
    },
    EmergencyFund,
    Quick {
        message: String,
    },
    Export,
}

fn main() -> Result<()> {
    init_tracing("finch_cli");
    let cli = Cli::parse();

    let kb = load_knowledge_base(cli.knowledge_base.as_deref())?;

    match cli.command {
        Command::Chat { profile } => {
            let advisor = FinanceAdvisor::new(kb, AppMetrics::shared(), cli.seed);
            run_chat(&advisor, &profile.to_profile())?;
        }
        Command::Ask {
            message,
            profile,
            json,
        } => {
            let advisor = FinanceAdvisor::new(kb, AppMetrics::shared(), cli.seed);
            let answered = advisor.handle_message(&message, &profile.to_profile())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&answered)?);
            } else {
                println!("{}", answered.reply.text);
            }
        }
        Command::Classify { message } => {
            println!("{}", classify_intent(&message));
        }
        Command::Tips { user_type } => {
            let tips = quick_tips(&UserType::parse(&user_type));
            if tips.is_empty() {
                println!("No quick tips for '{user_type}'.");
            }
            for tip in tips {
                println!("• {tip}");
            }
        }
        Command::Kb { command } => match command {
            KbCommand::Show { category, key } => {
                let category: Category = category.parse()?;
                match key {
                    Some(key) => print_list(kb.advice(category, &key)),
                    None => {
                        for key in kb.keys(category) {
                            println!("[{key}]");
                            print_list(kb.advice(category, key));
                        }
                    }
                }
            }
            KbCommand::EmergencyFund => print_list(kb.emergency_fund()),
            KbCommand::Quick { message } => match kb.quick_response(&message) {
                Some(hit) => println!("{}", serde_json::to_string_pretty(hit)?),
                None => println!("No quick response; the message goes through classification."),
            },
            KbCommand::Export => println!("{}", kb.to_json_pretty()?),
        },
    }

    Ok(())
}

fn run_chat(advisor: &FinanceAdvisor, profile: &UserProfile) -> Result<()> {
    let session_id = Uuid::new_v4();
    info!(session_id = %session_id, user_type = %profile.user_type, "chat started");

    println!("{GREETING}");
    println!("Type 'exit' to quit.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let reply = match advisor.handle_message(message, profile) {
            Ok(answered) => answered.reply.text,
            Err(err) => {
                warn!(session_id = %session_id, error = %format!("{err:#}"), "chat turn failed");
                APOLOGY_MESSAGE.to_string()
            }
        };

        println!("\n{reply}\n");
    }

    println!("{DISCLAIMER}");
    advisor.metrics().log_snapshot();
    Ok(())
}

fn load_knowledge_base(path: Option<&Path>) -> Result<Arc<KnowledgeBase>> {
    let kb = match path {
        Some(path) => KnowledgeBase::from_json_file(path)
            .with_context(|| format!("failed loading knowledge base from {}", path.display()))?,
        None => KnowledgeBase::builtin().clone(),
    };
    Ok(Arc::new(kb))
}

fn print_list(entries: &[String]) {
    for entry in entries {
        println!("- {entry}");
    }
}
