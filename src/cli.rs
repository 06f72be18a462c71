use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde_json::Value;
use std::path::{Path, PathBuf};

use circleci_actions::actions::{self, Category, Executor, Params};
use circleci_actions::client::CircleCiClient;
use circleci_actions::config::Config;
use circleci_actions::context::RunContext;
use circleci_actions::output::{self, ActionProgress};

#[derive(Parser)]
#[command(name = "circleci-actions")]
#[command(author, version, about = "CircleCI API actions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (TOML, JSON or YAML)
    #[arg(short, long, global = true, env = "CIRCLECI_ACTIONS_CONFIG")]
    config: Option<PathBuf>,

    /// Write the action result to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the available actions
    List {
        #[arg(short = 'C', long)]
        category: Option<String>,
    },

    /// Show the parameters and context keys of an action
    Describe { action: String },

    /// Run one action
    Run {
        action: String,

        /// Parameter as key=value; JSON objects and comma lists are accepted
        #[arg(short = 'P', long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// JSON file with a parameter object, overridden by --param
        #[arg(long)]
        params_file: Option<PathBuf>,

        /// Context file read before the run and written after it
        #[arg(long, env = "CIRCLECI_ACTIONS_CONTEXT")]
        context: Option<PathBuf>,
    },
}

impl Cli {
    fn execute_list(category: Option<&str>) -> Result<()> {
        let table = match category {
            Some(name) => {
                let Some(category) = Category::parse(name) else {
                    let known: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
                    bail!("Unknown category '{name}', expected one of: {}", known.join(", "));
                };
                output::actions_table(actions::by_category(category))
            }
            None => output::actions_table(actions::all()),
        };
        println!("{table}");
        Ok(())
    }

    fn execute_describe(action: &str) -> Result<()> {
        let action = actions::find(action)?;
        output::print_action_details(action);
        Ok(())
    }

    async fn execute_run(
        &self,
        name: &str,
        raw_params: &[String],
        params_file: Option<&Path>,
        context_path: Option<&Path>,
    ) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;
        let action = actions::find(name)?;
        let params = collect_params(raw_params, params_file)?;

        let mut ctx = match context_path {
            Some(path) if path.exists() => RunContext::load(path)
                .with_context(|| format!("Failed to read context file: {}", path.display()))?,
            _ => RunContext::new(),
        };

        let client = CircleCiClient::new(&config.api)?;
        let executor = Executor::new(&client).with_defaults(config.defaults.clone());

        info!("Running action {}", action.name);
        let progress = ActionProgress::start(action.name);
        let result = match executor.run(&mut ctx, action.name, &params).await {
            Ok(result) => {
                progress.succeed();
                result
            }
            Err(err) => {
                progress.fail();
                return Err(err.into());
            }
        };

        if let Some(path) = context_path {
            ctx.save(path)
                .with_context(|| format!("Failed to write context file: {}", path.display()))?;
            info!("Context written to: {}", path.display());
        }

        output::print_run_summary(action, &result, &ctx);

        let json_output = if self.pretty || config.output.pretty {
            serde_json::to_string_pretty(&result)?
        } else {
            serde_json::to_string(&result)?
        };

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, json_output)?;
            info!("Result written to: {}", output_path.display());
        } else {
            println!("{json_output}");
        }

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        match &self.command {
            Commands::List { category } => Self::execute_list(category.as_deref()),
            Commands::Describe { action } => Self::execute_describe(action),
            Commands::Run {
                action,
                params,
                params_file,
                context,
            } => {
                self.execute_run(action, params, params_file.as_deref(), context.as_deref())
                    .await
            }
        }
    }
}

/// Merge the params file and `key=value` pairs, the latter winning.
fn collect_params(raw: &[String], file: Option<&Path>) -> Result<Params> {
    let mut params = Params::new();

    if let Some(path) = file {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read params file: {}", path.display()))?;
        let parsed: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse params file: {}", path.display()))?;
        let Value::Object(map) = parsed else {
            bail!("Params file must contain a JSON object: {}", path.display());
        };
        params.extend(map);
    }

    for pair in raw {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid parameter '{pair}', expected KEY=VALUE");
        };
        params.insert(key.trim().to_string(), Value::String(value.to_string()));
    }

    Ok(params)
}
