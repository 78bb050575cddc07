//! Command-line demo client for the Tasklight backend.
//!
//! The session persists in the platform data directory, so `tasklight
//! login` followed by `tasklight tasks list` behaves like one browsing
//! session. Diagnostics go to stderr; stdout carries only command output.

use std::sync::Arc;

use tasklight::api::{AuthApi, ChatApi, TasksApi};
use tasklight::types::{ChatRequest, NewTask, Task};
use tasklight::{ClientConfig, ClientContext, FileTokenStore, RequestGateway};
use uuid::Uuid;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("tasklight: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let store = FileTokenStore::at_default_path()?;
    let context = ClientContext::new(Arc::new(store));
    let gateway = RequestGateway::new(ClientConfig::from_env(), context);

    match args[1].as_str() {
        "login" => {
            let (email, password) = credential_args(&args)?;
            let resp = AuthApi::new(&gateway).login(email, password).await?;
            println!("logged in as {}", resp.user.email);
            Ok(())
        }
        "register" => {
            let (email, password) = credential_args(&args)?;
            let resp = AuthApi::new(&gateway).register(email, password).await?;
            println!("registered {}", resp.user.email);
            Ok(())
        }
        "logout" => {
            AuthApi::new(&gateway).logout().await;
            println!("logged out");
            Ok(())
        }
        "whoami" => whoami(&gateway).await,
        "tasks" => tasks_command(&gateway, &args[2..]).await,
        "chat" => {
            let message = args
                .get(2)
                .ok_or_else(|| anyhow::anyhow!("chat requires a message"))?;
            let user_id = current_user(&gateway).await?;
            let resp = ChatApi::new(&gateway)
                .send(&user_id, &ChatRequest::new(message))
                .await?;
            println!("{}", resp.response);
            for call in &resp.tool_calls {
                eprintln!("(assistant ran {})", call.tool);
            }
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => anyhow::bail!("unknown command `{other}` (run `tasklight help`)"),
    }
}

async fn whoami(gateway: &RequestGateway) -> anyhow::Result<()> {
    match gateway.session().user_info().await {
        Some(claims) => {
            println!(
                "{} (id {})",
                claims.email.as_deref().unwrap_or("<no email claim>"),
                claims.sub.as_deref().unwrap_or("<no subject claim>"),
            );
            if gateway.session().is_token_expiring_soon().await {
                eprintln!("warning: session expires soon; log in again to refresh it");
            }
            Ok(())
        }
        None => {
            println!("not logged in");
            Ok(())
        }
    }
}

async fn tasks_command(gateway: &RequestGateway, args: &[String]) -> anyhow::Result<()> {
    let user_id = current_user(gateway).await?;
    let tasks = TasksApi::new(gateway);

    match args.first().map(String::as_str) {
        Some("list") | None => {
            let all = tasks.list(&user_id).await?;
            if all.is_empty() {
                println!("no tasks");
            }
            for task in &all {
                print_task(task);
            }
            Ok(())
        }
        Some("add") => {
            let title = args
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("add requires a title"))?;
            let mut new_task = NewTask::new(title);
            if let Some(description) = args.get(2) {
                new_task = new_task.with_description(description);
            }
            let task = tasks.create(&user_id, &new_task).await?;
            print_task(&task);
            Ok(())
        }
        Some("done") => {
            let id = task_id_arg(args)?;
            let task = tasks.set_completed(&user_id, id, true).await?;
            print_task(&task);
            Ok(())
        }
        Some("reopen") => {
            let id = task_id_arg(args)?;
            let task = tasks.set_completed(&user_id, id, false).await?;
            print_task(&task);
            Ok(())
        }
        Some("rm") => {
            let id = task_id_arg(args)?;
            tasks.delete(&user_id, id).await?;
            println!("deleted {id}");
            Ok(())
        }
        Some(other) => {
            anyhow::bail!("unknown tasks subcommand `{other}` (use list|add|done|reopen|rm)")
        }
    }
}

/// Resolve the logged-in user id or explain how to get one.
async fn current_user(gateway: &RequestGateway) -> anyhow::Result<String> {
    if !gateway.session().is_authenticated().await {
        anyhow::bail!("not logged in (run `tasklight login <email> <password>` first)");
    }
    gateway
        .session()
        .user_id()
        .await
        .ok_or_else(|| anyhow::anyhow!("session has no user id; log in again"))
}

fn credential_args(args: &[String]) -> anyhow::Result<(&str, &str)> {
    match (args.get(2), args.get(3)) {
        (Some(email), Some(password)) => Ok((email, password)),
        _ => anyhow::bail!("usage: tasklight {} <email> <password>", args[1]),
    }
}

fn task_id_arg(args: &[String]) -> anyhow::Result<Uuid> {
    let raw = args
        .get(1)
        .ok_or_else(|| anyhow::anyhow!("missing task id"))?;
    Uuid::parse_str(raw).map_err(|_| anyhow::anyhow!("`{raw}` is not a task id"))
}

fn print_task(task: &Task) {
    println!(
        "{} {}  {}",
        if task.completed { "[x]" } else { "[ ]" },
        task.id,
        task.title
    );
    if let Some(description) = &task.description {
        println!("       {description}");
    }
}

fn print_usage() {
    println!("usage: tasklight <command>");
    println!();
    println!("  login <email> <password>     sign in and save the session");
    println!("  register <email> <password>  create an account and sign in");
    println!("  logout                       drop the saved session");
    println!("  whoami                       show the logged-in user");
    println!("  tasks [list]                 list your tasks");
    println!("  tasks add <title> [desc]     create a task");
    println!("  tasks done <id>              mark a task completed");
    println!("  tasks reopen <id>            mark a task not completed");
    println!("  tasks rm <id>                delete a task");
    println!("  chat <message>               ask the assistant");
    println!();
    println!("environment: TASKLIGHT_API_URL overrides the backend base URL");
}
