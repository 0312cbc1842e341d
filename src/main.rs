use std::io::Write;

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use codeleap_feed::api::PostStoreClient;
use codeleap_feed::config::Config;
use codeleap_feed::feed::{FeedController, FeedError};
use codeleap_feed::session::{Session, SessionStore};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    info!("Starting codeleap-feed");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(api_base_url = %config.api_base_url, "Configuration loaded");

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    // Entry gate: reuse the stored identity or prompt for one.
    let store = SessionStore::new(config.session_path.clone());
    let session = match store.load().await? {
        Some(session) => session,
        None => {
            let session = prompt_for_username(&mut input).await?;
            store.save(&session).await?;
            session
        }
    };
    println!("Welcome to CodeLeap network, {}!", session.username);

    let client = PostStoreClient::new(&config.api_base_url, config.http_timeout)
        .context("Invalid API base URL")?;

    let shutdown = CancellationToken::new();
    let mut controller = FeedController::new(client, session, shutdown.clone());

    // Cancel the token on Ctrl-C / SIGTERM so no in-flight refresh lands
    // after teardown.
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutdown signal received");
        signal_token.cancel();
    });

    if let Err(e) = controller.load().await {
        report(&controller, &e);
    } else {
        print_feed(&controller);
    }

    // The clock tick refreshes age labels only; it never refetches.
    let mut clock = tokio::time::interval(config.clock_tick);
    clock.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    clock.tick().await; // first tick resolves immediately

    loop {
        prompt("> ");
        let line = tokio::select! {
            () = shutdown.cancelled() => break,
            _ = clock.tick() => {
                controller.tick(Utc::now());
                continue;
            }
            line = input.next_line() => line.context("Failed to read input")?,
        };
        let Some(line) = line else { break };
        if !dispatch(&mut controller, &mut input, line.trim()).await? {
            break;
        }
    }

    shutdown.cancel();
    info!("Bye");
    Ok(())
}

/// Run one command. Returns false when the loop should exit.
async fn dispatch(
    controller: &mut FeedController,
    input: &mut Lines<BufReader<Stdin>>,
    line: &str,
) -> Result<bool> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    match command {
        "" => {}
        "help" => print_help(),
        "list" => print_feed(controller),
        "refresh" => match controller.load().await {
            Ok(()) => print_feed(controller),
            Err(e) => report(controller, &e),
        },
        "post" => {
            let Some(title) = prompt_line(input, "Title: ").await? else {
                return Ok(false);
            };
            let Some(content) = prompt_line(input, "Content: ").await? else {
                return Ok(false);
            };
            match controller.submit_new_post(&title, &content).await {
                Ok(()) => print_feed(controller),
                Err(e) => report(controller, &e),
            }
        }
        "delete" => {
            let Some(id) = parse_own_post_id(controller, rest, "delete") else {
                return Ok(true);
            };
            controller.request_delete(Some(id));
            let answer =
                prompt_line(input, "Are you sure you want to delete this item? [y/N] ").await?;
            if answer.as_deref().map(str::trim) == Some("y") {
                match controller.confirm_delete().await {
                    Ok(()) => print_feed(controller),
                    Err(e) => report(controller, &e),
                }
            } else {
                controller.cancel_delete();
                println!("Cancelled.");
            }
        }
        "edit" => {
            let Some(id) = parse_own_post_id(controller, rest, "edit") else {
                return Ok(true);
            };
            let Some(post) = controller.posts().iter().find(|p| p.id == Some(id)).cloned() else {
                return Ok(true);
            };
            controller.request_edit(post);
            let form = controller.edit_form_mut().expect("edit dialog just opened");
            let title_prompt = format!("Title [{}]: ", form.title());
            if let Some(title) = prompt_line(input, &title_prompt).await? {
                if !title.trim().is_empty() {
                    form.set_title(title);
                }
            }
            let form = controller.edit_form_mut().expect("edit dialog still open");
            let content_prompt = format!("Content [{}]: ", form.content());
            if let Some(content) = prompt_line(input, &content_prompt).await? {
                if !content.trim().is_empty() {
                    form.set_content(content);
                }
            }
            match controller.confirm_edit().await {
                Ok(()) => print_feed(controller),
                Err(e) => {
                    report(controller, &e);
                    controller.cancel_edit();
                }
            }
        }
        "like" => {
            if let Some(card) = rest.parse().ok().and_then(|id| controller.card_mut(id)) {
                card.like();
                println!("{} likes", card.likes());
            } else {
                println!("No such post. Usage: like <id>");
            }
        }
        "comment" => {
            let Ok(id) = rest.parse::<i64>() else {
                println!("Usage: comment <id>");
                return Ok(true);
            };
            if controller.card_mut(id).is_none() {
                println!("No such post.");
                return Ok(true);
            }
            let Some(text) = prompt_line(input, "Comment: ").await? else {
                return Ok(false);
            };
            let card = controller.card_mut(id).expect("card checked above");
            card.toggle_composer();
            card.set_draft(text);
            if card.submit_comment() {
                println!("Comment added.");
            } else {
                card.cancel_comment();
                println!("Comment cannot be empty.");
            }
        }
        "quit" | "exit" => return Ok(false),
        other => println!("Unknown command '{other}'. Try 'help'."),
    }
    Ok(true)
}

/// Resolve a post id argument the session owns. Edit/delete stay gated on
/// ownership, as in the card UI.
fn parse_own_post_id(controller: &FeedController, arg: &str, verb: &str) -> Option<i64> {
    let Ok(id) = arg.parse::<i64>() else {
        println!("Usage: {verb} <id>");
        return None;
    };
    let Some(card) = controller.cards().iter().find(|c| c.post().id == Some(id)) else {
        println!("No such post.");
        return None;
    };
    if !card.can_modify() {
        println!("You can only {verb} your own posts.");
        return None;
    }
    Some(id)
}

async fn prompt_for_username(input: &mut Lines<BufReader<Stdin>>) -> Result<Session> {
    loop {
        let Some(line) = prompt_line(input, "Please enter your name: ").await? else {
            anyhow::bail!("stdin closed before a username was entered");
        };
        match Session::new(&line) {
            Ok(session) => return Ok(session),
            Err(e) => println!("{e}"),
        }
    }
}

async fn prompt_line(
    input: &mut Lines<BufReader<Stdin>>,
    message: &str,
) -> Result<Option<String>> {
    prompt(message);
    input.next_line().await.context("Failed to read input")
}

fn prompt(message: &str) {
    print!("{message}");
    let _ = std::io::stdout().flush();
}

fn print_feed(controller: &FeedController) {
    if !controller.is_loaded() {
        println!("(feed not loaded yet - try 'refresh')");
        return;
    }
    if controller.cards().is_empty() {
        println!("No posts yet. What's on your mind? Try 'post'.");
        return;
    }
    let now = controller.current_time();
    for card in controller.cards() {
        let post = card.post();
        let id = post.id.map_or_else(|| "-".to_string(), |id| id.to_string());
        let yours = if card.can_modify() { " (yours)" } else { "" };
        println!("#{id} {} - @{}{yours}, {}", post.title, post.username, card.age_label(now));
        println!("    {}", post.content);
        println!("    {} likes", card.likes());
        for comment in card.comments() {
            println!("    @{}: {}", comment.username, comment.content);
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  list           show the feed");
    println!("  refresh        refetch the feed from the server");
    println!("  post           create a post");
    println!("  edit <id>      edit one of your posts");
    println!("  delete <id>    delete one of your posts");
    println!("  like <id>      like a post (local only)");
    println!("  comment <id>   comment on a post (local only)");
    println!("  quit           exit");
}

fn report(controller: &FeedController, err: &FeedError) {
    if let Some(banner) = controller.banner() {
        println!("error: {banner}");
    } else {
        println!("error: {err}");
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,codeleap_feed=info"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
