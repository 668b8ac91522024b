use anyhow::Context;
use clap::Parser;
use uuid::Uuid;

use jobtrack::{
    applications::{
        dto::{CreateApplicationRequest, UpdateApplicationRequest},
        repo_types::{ApplicationStatus, UnknownStatus},
    },
    client::{
        filter::ApplicationFilter,
        render::{render_list, render_summary},
        ApiClient,
    },
};

/// Terminal dashboard for the JobTrack API
#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base url of the API server
    #[clap(long, env = "JOBTRACK_URL", default_value = "http://localhost:8080")]
    url: String,

    /// Session token returned by `login`
    #[clap(long, env = "JOBTRACK_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Json output
    #[clap(long)]
    json: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, clap::Subcommand)]
enum Command {
    /// Create an account
    Register {
        #[clap(long)]
        name: String,
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },

    /// Sign in and print a session token
    Login {
        #[clap(long)]
        email: String,
        #[clap(long)]
        password: String,
    },

    /// Show who the current token belongs to
    Whoami,

    /// List applications, optionally filtered
    List {
        /// Only show applications in this stage
        #[clap(long, value_parser = parse_status)]
        status: Option<ApplicationStatus>,

        /// Case-insensitive text match on company, role, location, salary and notes
        #[clap(long)]
        search: Option<String>,
    },

    /// Add an application
    Add {
        #[clap(long)]
        company: String,
        #[clap(long)]
        role: String,
        #[clap(long)]
        location: Option<String>,
        #[clap(long)]
        url: Option<String>,
        #[clap(long)]
        salary: Option<String>,
        #[clap(long)]
        notes: Option<String>,
        #[clap(long, value_parser = parse_status)]
        status: Option<ApplicationStatus>,
    },

    /// Move an application to another stage
    Status {
        id: Uuid,
        #[clap(value_parser = parse_status)]
        status: ApplicationStatus,
    },

    /// Delete an application
    Rm { id: Uuid },
}

fn parse_status(s: &str) -> Result<ApplicationStatus, UnknownStatus> {
    s.to_ascii_uppercase().parse()
}

/// Blank flags are left out of the request entirely.
fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let client = ApiClient::new(&cli.url, cli.token.clone())?;

    match cli.command {
        Command::Register {
            name,
            email,
            password,
        } => {
            client.register(&name, &email, &password).await?;
            println!("Account created. Run `jobtrack login` to sign in.");
        }
        Command::Login { email, password } => {
            let res = client.login(&email, &password).await?;
            if cli.json {
                print_json(&res)?;
            } else {
                eprintln!("Signed in as {} <{}>", res.user.name, res.user.email);
                println!("{}", res.token);
            }
        }
        Command::Whoami => {
            let me = client.me().await?;
            if cli.json {
                print_json(&me)?;
            } else {
                println!("{} <{}> ({})", me.name, me.email, me.id);
            }
        }
        Command::List { status, search } => {
            let all = client.list().await?;
            let filter = ApplicationFilter::new(status, search.as_deref());
            let shown = filter.apply(&all);
            if cli.json {
                print_json(&shown)?;
            } else {
                println!("{}", render_summary(&all));
                print!("{}", render_list(&shown));
            }
        }
        Command::Add {
            company,
            role,
            location,
            url,
            salary,
            notes,
            status,
        } => {
            let req = CreateApplicationRequest {
                company: Some(company),
                role_title: Some(role),
                location: non_empty(location),
                status: Some(status.unwrap_or_default().to_string()),
                url: non_empty(url),
                salary_range: non_empty(salary),
                notes: non_empty(notes),
            };
            let created = client.create(&req).await?;
            if cli.json {
                print_json(&created)?;
            } else {
                print!("{}", render_list(&[&created]));
            }
        }
        Command::Status { id, status } => {
            let req = UpdateApplicationRequest {
                status: Some(status.to_string()),
                ..Default::default()
            };
            let updated = client.update(id, &req).await?;
            if cli.json {
                print_json(&updated)?;
            } else {
                println!("{} - {} is now {}", updated.company, updated.role_title, updated.status);
            }
        }
        Command::Rm { id } => {
            client.delete(id).await?;
            println!("Deleted {id}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await.context("jobtrack") {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}
