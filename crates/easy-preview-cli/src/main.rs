// easy-preview - command-line front end
//
// Runs the preview core without a browser: lists devices, reconciles
// dimensions, computes drags, builds share links, restores share links and
// dry-runs load classification against a scripted frame.
//
// Logging follows RUST_LOG, e.g. `RUST_LOG=easy_preview=debug`.

mod scripted;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use easy_preview::preview::{FeedbackCategory, FilePreferenceStore, compute_resize, submit_feedback};
use easy_preview::{
    DEVICES, FeedbackForm, HandleKind, LiveSize, LoadPolicy, Presentation, PreviewApp, QueryState,
    ShareOptions, ThemeManager, reconcile,
};
use scripted::{JsonLinesBackend, ScriptedFrame};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "easy-preview", version, about = "Responsive preview core tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the device catalog
    Devices {
        #[arg(long)]
        json: bool,
    },
    /// Map dimensions to a device preset or `custom`
    Reconcile { width: u32, height: u32 },
    /// Compute the size produced by dragging a handle
    Resize {
        /// right, bottom, bottom-right, left, top, top-left, top-right, bottom-left
        #[arg(long)]
        handle: HandleKind,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        dx: f64,
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        dy: f64,
    },
    /// Print share link, embed code and full-screen link for a preview
    Share {
        url: String,
        #[arg(long, env = "EASY_PREVIEW_BASE_URL", default_value = "http://localhost:8080/")]
        base: String,
        #[arg(long)]
        device: Option<String>,
        #[arg(long, short = 'W')]
        width: Option<String>,
        #[arg(long, short = 'H')]
        height: Option<String>,
        /// Omit frameborder="0" from the embed code
        #[arg(long)]
        with_border: bool,
    },
    /// Show the state a share link restores
    Restore { link: String },
    /// Dry-run a load of URL against a frame exposing the given probe
    Load {
        url: String,
        /// JSON policy file; missing fields keep their defaults
        #[arg(long)]
        policy: Option<PathBuf>,
        /// Address the frame resolves to (omit for an unreadable address)
        #[arg(long)]
        address: Option<String>,
        /// Readable body text (omit for a cross-origin document)
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        markup: Option<String>,
        /// Deliver the load event after this many milliseconds
        #[arg(long)]
        load_after: Option<u64>,
        /// Deliver an error event instead of a load event
        #[arg(long)]
        error: bool,
    },
    /// Show or cycle the stored theme preference
    Theme {
        #[arg(long, env = "EASY_PREVIEW_PREFS", default_value = "easy-preview-prefs.json")]
        store: PathBuf,
        #[arg(long)]
        toggle: bool,
    },
    /// Validate feedback and append it to a JSON-lines file
    Feedback {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value_t = 0)]
        rating: u8,
        /// query, request, collaboration or bug
        #[arg(long)]
        category: Option<FeedbackCategory>,
        #[arg(long)]
        message: String,
        #[arg(long, default_value = "feedback.jsonl")]
        out: PathBuf,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Devices { json } => list_devices(json)?,
        Command::Reconcile { width, height } => {
            let identity = reconcile(width, height);
            println!("{} ({})", identity, identity.device().label());
        }
        Command::Resize {
            handle,
            width,
            height,
            dx,
            dy,
        } => {
            let live = compute_resize(handle, LiveSize::new(width, height), dx, dy);
            let viewport = live.to_viewport();
            println!("{} -> {}", viewport, reconcile(viewport.width, viewport.height));
        }
        Command::Share {
            url,
            base,
            device,
            width,
            height,
            with_border,
        } => {
            let options = ShareOptions::new(&base)?.frameborder_zero(!with_border);
            let query = QueryState {
                url: Some(url),
                device,
                width,
                height,
                embed: false,
            };
            let app = restore_app(&query)?;
            let links = app
                .share_links(&options)
                .context("the URL did not validate")?;
            println!("share:       {}", links.share_url);
            println!("full screen: {}", links.full_screen_url);
            println!("embed:       {}", links.embed_code);
        }
        Command::Restore { link } => {
            let query = QueryState::from_page_url(&link)?;
            if query.is_empty() {
                bail!("{} carries no preview state", link);
            }
            let app = restore_app(&query)?;
            println!("{}", serde_json::to_string_pretty(&app.snapshot())?);
            if query.embed {
                println!("(embed mode)");
            }
        }
        Command::Load {
            url,
            policy,
            address,
            text,
            markup,
            load_after,
            error,
        } => {
            let policy = match policy {
                Some(path) => LoadPolicy::from_json_file(path)?,
                None => LoadPolicy::default(),
            }
            .with_env_overrides();
            let frame = Arc::new(ScriptedFrame::new(address, text, markup));
            dry_run_load(frame, policy, &url, load_after, error).await?;
        }
        Command::Theme { store, toggle } => {
            let mut manager = ThemeManager::load(Box::new(FilePreferenceStore::new(store)));
            let theme = if toggle {
                manager.toggle()
            } else {
                manager.current()
            };
            println!("{} {}", theme.icon(), theme.label());
        }
        Command::Feedback {
            name,
            email,
            rating,
            category,
            message,
            out,
        } => {
            let form = FeedbackForm {
                name,
                email,
                rating,
                category,
                message,
            };
            submit_feedback(&JsonLinesBackend::new(&out), &form).await?;
            println!("Thank you! Your feedback was saved to {}", out.display());
        }
    }

    Ok(())
}

fn list_devices(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(DEVICES)?);
        return Ok(());
    }
    for device in DEVICES {
        println!("{:<20} {}", device.id, device.label());
    }
    Ok(())
}

/// Builds an app in the state a share link with `query` would restore.
///
/// Restoring may start a load; nothing drives it here, so the frame is inert.
fn restore_app(query: &QueryState) -> Result<PreviewApp> {
    let frame = Arc::new(ScriptedFrame::new(None, None, None));
    let mut app = PreviewApp::new(frame, LoadPolicy::default())?;
    app.restore(query);
    Ok(app)
}

async fn dry_run_load(
    frame: Arc<ScriptedFrame>,
    policy: LoadPolicy,
    url: &str,
    load_after: Option<u64>,
    error: bool,
) -> Result<()> {
    let budget = policy.timeout_duration() + policy.settle_duration() + Duration::from_secs(1);
    let mut app = PreviewApp::new(frame, policy)?;
    let mut updates = app.monitor().subscribe();
    let attempt = app.submit_url(url)?;

    if error {
        app.on_frame_error(attempt);
    } else if let Some(ms) = load_after {
        let monitor = app.monitor().clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            monitor.on_load(attempt);
        });
    }

    let wait = async {
        loop {
            let presentation = updates.borrow_and_update().clone();
            println!("{}", describe(&presentation));
            if !matches!(presentation, Presentation::Loading { .. } | Presentation::Empty) {
                return Ok::<_, anyhow::Error>(());
            }
            updates.changed().await?;
        }
    };
    match tokio::time::timeout(budget, wait).await {
        Ok(result) => result,
        Err(_) => {
            println!("still loading after {:?}: readable document without a load event", budget);
            Ok(())
        }
    }
}

fn describe(presentation: &Presentation) -> String {
    match presentation {
        Presentation::Frame { url } => format!("shown: {}", url),
        Presentation::Blocked { url, reason } => format!(
            "blocked ({}): {} [{}]",
            reason,
            presentation.message().unwrap_or_default(),
            url
        ),
        other => format!(
            "{} [{}]",
            other.message().unwrap_or_default(),
            other.external_url().unwrap_or("-")
        ),
    }
}
