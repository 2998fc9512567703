//! Command-line interface
//!
//! Thin command handlers over the service layers:
//! - `install`: Bootstrap the platform into a cluster
//! - `create` / `get` / `delete`: Environment and repository management
//! - `promote`: Move an application version into an environment
//! - `start pipeline`: Record a new pipeline run
//! - `fork` / `import`: Repository workflows
//! - `step git credentials`: Render a git credentials file
//! - `completions`: Generate shell completions
//!
//! Each handler parses its flags into an options struct and delegates;
//! failures bubble up as `anyhow` errors and exit non-zero.

pub mod completions;
pub mod credentials;
pub mod environment;
pub mod install;
pub mod pipeline;
pub mod promote;
pub mod repository;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

use crate::infrastructure::{Config, init_logging};
use crate::kube::PromotionStrategy;

/// CLI arguments for jx
#[derive(Parser, Debug)]
#[command(name = "jx")]
#[command(author, version, about = "Continuous delivery for Kubernetes", long_about = None)]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the kubeconfig file to use
    #[arg(long, global = true, value_name = "FILE")]
    kubeconfig: Option<PathBuf>,

    /// Team namespace holding the platform resources
    #[arg(short = 'n', long, global = true)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bootstrap the platform into the current cluster
    Install {
        /// Chart repository hosting the platform chart
        #[arg(long)]
        chart_repo: Option<String>,
        /// Platform chart version to install
        #[arg(long)]
        version: Option<String>,
        /// Skip creating the default environments
        #[arg(long)]
        no_default_environments: bool,
    },

    /// Create a resource
    Create {
        #[command(subcommand)]
        resource: CreateCommand,
    },

    /// Display one or more resources
    Get {
        #[command(subcommand)]
        resource: GetCommand,
    },

    /// Delete a resource
    Delete {
        #[command(subcommand)]
        resource: DeleteCommand,
    },

    /// Start a process
    Start {
        #[command(subcommand)]
        what: StartCommand,
    },

    /// Promote an application version into an environment
    Promote {
        /// Application to promote
        #[arg(long)]
        app: String,
        /// Version to promote
        #[arg(long)]
        version: String,
        /// Target environment name
        #[arg(long)]
        env: String,
        /// Chart reference, defaults to `<repo alias>/<app>`
        #[arg(long)]
        chart: Option<String>,
    },

    /// Fork a repository and clone the fork locally
    Fork {
        /// Repository URL to fork
        url: String,
        /// Directory to clone into (defaults to the repository name)
        dir: Option<PathBuf>,
    },

    /// Push a local repository to a newly created remote
    Import {
        /// Directory holding the repository (defaults to the current)
        dir: Option<PathBuf>,
        /// Repository name (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Pipeline steps used from automation
    Step {
        #[command(subcommand)]
        step: StepCommand,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: ShellArg,
    },

    /// Print the jx version
    Version,
}

#[derive(Subcommand, Debug)]
enum CreateCommand {
    /// Create or update an Environment resource
    Environment {
        /// Environment name
        name: String,
        /// Namespace the environment deploys into
        #[arg(long)]
        namespace: Option<String>,
        /// Position in the promotion order
        #[arg(long, default_value_t = 100)]
        order: i32,
        /// Promotion strategy for the environment
        #[arg(long, value_enum, default_value_t = PromotionArg::Manual)]
        promotion: PromotionArg,
        /// Git URL of the environment repository
        #[arg(long)]
        source: Option<String>,
        /// Human-readable label (defaults to the capitalized name)
        #[arg(long)]
        label: Option<String>,
    },

    /// Create a repository on the configured git server
    Repo {
        /// Repository name
        name: String,
        /// Organization to create under
        #[arg(long)]
        owner: Option<String>,
        /// Create the repository as private
        #[arg(long)]
        private: bool,
        /// Repository description
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum GetCommand {
    /// List environments in promotion order
    Environments,
    /// List pipeline activity, newest first
    Activities {
        /// Only show pipelines containing this substring
        #[arg(short, long)]
        filter: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum DeleteCommand {
    /// Delete an Environment resource
    Environment {
        /// Environment name
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum StartCommand {
    /// Record a new pipeline run with a fresh build number
    Pipeline {
        /// Pipeline name, `owner/repo/branch` form
        name: String,
    },
}

#[derive(Subcommand, Debug)]
enum StepCommand {
    /// Git-related steps
    Git {
        #[command(subcommand)]
        step: GitStepCommand,
    },
}

#[derive(Subcommand, Debug)]
enum GitStepCommand {
    /// Render the git credentials file for the configured servers
    Credentials {
        /// Output file (defaults to ~/.git-credentials)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PromotionArg {
    Never,
    Auto,
    Manual,
}

impl std::fmt::Display for PromotionArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Never => write!(f, "never"),
            Self::Auto => write!(f, "auto"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

impl From<PromotionArg> for PromotionStrategy {
    fn from(arg: PromotionArg) -> Self {
        match arg {
            PromotionArg::Never => Self::Never,
            PromotionArg::Auto => Self::Auto,
            PromotionArg::Manual => Self::Manual,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShellArg {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Build the CLI command for completion generation
#[must_use]
pub fn build_cli() -> clap::Command {
    Args::command()
}

/// Parse and execute CLI arguments
///
/// # Errors
///
/// Returns the first error from the selected command; `main` prints it
/// and exits non-zero.
pub async fn run() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&Config::default_path()?)?;
    init_logging(if args.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    });

    let team_namespace = args
        .namespace
        .clone()
        .unwrap_or_else(|| config.team_namespace.clone());
    let kubeconfig = args.kubeconfig.as_deref();

    match args.command {
        Command::Install {
            chart_repo,
            version,
            no_default_environments,
        } => {
            let opts = install::InstallOptions {
                namespace: team_namespace,
                kubeconfig: args.kubeconfig.clone(),
                chart_repo: chart_repo.unwrap_or_else(|| config.platform_chart_repo.clone()),
                chart: config.platform_chart.clone(),
                release: config.platform_release.clone(),
                version,
                no_default_environments,
                git_server: config.git_server.clone(),
            };
            install::install(&opts).await?;
        }
        Command::Create { resource } => match resource {
            CreateCommand::Environment {
                name,
                namespace,
                order,
                promotion,
                source,
                label,
            } => {
                let opts = environment::CreateEnvironmentOptions {
                    name,
                    namespace,
                    order,
                    promotion_strategy: promotion.into(),
                    source,
                    label,
                    team_namespace,
                    kubeconfig: args.kubeconfig.clone(),
                };
                environment::create(&opts).await?;
            }
            CreateCommand::Repo {
                name,
                owner,
                private,
                description,
            } => {
                repository::create_repo(&repository::CreateRepoOptions {
                    name,
                    owner,
                    private,
                    description,
                    server: config.git_server.clone(),
                })
                .await?;
            }
        },
        Command::Get { resource } => match resource {
            GetCommand::Environments => {
                environment::list(kubeconfig, &team_namespace).await?;
            }
            GetCommand::Activities { filter } => {
                pipeline::get_activities(kubeconfig, &team_namespace, filter.as_deref()).await?;
            }
        },
        Command::Delete { resource } => match resource {
            DeleteCommand::Environment { name } => {
                environment::delete(kubeconfig, &team_namespace, &name).await?;
            }
        },
        Command::Start { what } => match what {
            StartCommand::Pipeline { name } => {
                pipeline::start_pipeline(kubeconfig, &team_namespace, &name).await?;
            }
        },
        Command::Promote {
            app,
            version,
            env,
            chart,
        } => {
            let opts = promote::PromoteOptions {
                app,
                version,
                env,
                chart,
                team_namespace,
                kubeconfig: args.kubeconfig.clone(),
            };
            promote::promote(&opts).await?;
        }
        Command::Fork { url, dir } => {
            repository::fork(&url, dir.as_deref()).await?;
        }
        Command::Import { dir, name } => {
            repository::import(dir.as_deref(), name.as_deref(), kubeconfig, &team_namespace)
                .await?;
        }
        Command::Step { step } => match step {
            StepCommand::Git { step } => match step {
                GitStepCommand::Credentials { output } => {
                    credentials::write_credentials(output.as_deref())?;
                }
            },
        },
        Command::Completions { shell } => {
            let shell = match shell {
                ShellArg::Bash => clap_complete::Shell::Bash,
                ShellArg::Zsh => clap_complete::Shell::Zsh,
                ShellArg::Fish => clap_complete::Shell::Fish,
                ShellArg::PowerShell => clap_complete::Shell::PowerShell,
            };
            let output =
                completions::generate_completions(shell).context("Failed to generate completions")?;
            println!("{output}");
        }
        Command::Version => {
            println!("jx version {}", crate::VERSION);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_parse_promote() {
        let args = Args::try_parse_from([
            "jx", "promote", "--app", "my-app", "--version", "1.2.3", "--env", "staging",
        ])
        .unwrap();
        match args.command {
            Command::Promote { app, version, env, chart } => {
                assert_eq!(app, "my-app");
                assert_eq!(version, "1.2.3");
                assert_eq!(env, "staging");
                assert_eq!(chart, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let args = Args::try_parse_from([
            "jx",
            "get",
            "environments",
            "--namespace",
            "other-team",
            "--verbose",
        ])
        .unwrap();
        assert!(args.verbose);
        assert_eq!(args.namespace.as_deref(), Some("other-team"));
    }

    #[test]
    fn test_parse_create_environment_defaults() {
        let args =
            Args::try_parse_from(["jx", "create", "environment", "staging"]).unwrap();
        match args.command {
            Command::Create {
                resource:
                    CreateCommand::Environment {
                        name,
                        order,
                        promotion,
                        ..
                    },
            } => {
                assert_eq!(name, "staging");
                assert_eq!(order, 100);
                assert_eq!(promotion, PromotionArg::Manual);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
