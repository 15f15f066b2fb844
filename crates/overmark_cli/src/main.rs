//! Overlay playground entry point.
//!
//! # Responsibility
//! - Drive one scripted overlay session against a mock comment server.
//! - Print the final store state as JSON for quick local sanity checks.

use clap::Parser;
use log::info;
use overmark_core::{
    init_logging, CallbackError, Comment, CommentPersistence, CommentScope, CommentStore,
    CommitFuture, ContentBounds, OverlayConfig, OverlayError, OverlayOptions, OverlayState,
    OverlaySurface, PointerDown, PointerEvent, TxResult, User,
};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "overmark", version, about = "Scripted comment overlay playground")]
struct Cli {
    /// Prefix for generated comment ids.
    #[arg(long)]
    id_prefix: Option<String>,

    /// Make the mock server reject the confirm call.
    #[arg(long)]
    fail_confirm: bool,

    /// Absolute directory for rolling log files.
    #[arg(long)]
    log_dir: Option<String>,

    /// Log level used with `--log-dir`.
    #[arg(long, default_value = "debug")]
    log_level: String,
}

/// Stand-in for the remote comment database.
struct MockServer {
    fail_confirm: AtomicBool,
}

impl MockServer {
    fn describe(comments: &[Comment]) -> String {
        comments
            .iter()
            .map(|comment| comment.id.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl CommentPersistence for MockServer {
    fn on_confirm(&self, comments: Vec<Comment>) -> CommitFuture {
        let fail = self.fail_confirm.load(Ordering::SeqCst);
        Box::pin(async move {
            eprintln!(
                "server: adding {} comment(s) ids={}",
                comments.len(),
                Self::describe(&comments)
            );
            if fail {
                return Err(CallbackError::from("database unavailable"));
            }
            Ok(())
        })
    }

    fn on_resolve(&self, comments: Vec<Comment>) -> CommitFuture {
        Box::pin(async move {
            eprintln!(
                "server: resolving {} comment(s) ids={}",
                comments.len(),
                Self::describe(&comments)
            );
            Ok(())
        })
    }

    fn on_error(&self, error: &OverlayError) {
        eprintln!("server: {error}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        if let Err(err) = init_logging(&cli.log_level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("failed to start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let config = OverlayConfig {
        id_prefix: cli.id_prefix,
        ..OverlayConfig::default()
    };
    let server = Arc::new(MockServer {
        fail_confirm: AtomicBool::new(cli.fail_confirm),
    });
    let options = OverlayOptions::new(Some(User::named("Playground User")))
        .with_initial_state(OverlayState::Idle)
        .with_config(config);
    let store = CommentStore::new(options, server.clone()).map_err(|err| err.to_string())?;

    let bounds = ContentBounds::new(100.0, 50.0, 800.0, 600.0);
    let mut surface = OverlaySurface::new();

    // Click at (120, 70): a point comment.
    place(&store, &mut surface, &bounds, &[(120.0, 70.0)])?;
    write_active_draft(&store, "Fix the heading spacing")?;

    // Drag (300, 200) -> (380, 260): an area comment.
    place(
        &store,
        &mut surface,
        &bounds,
        &[(300.0, 200.0), (340.0, 230.0), (380.0, 260.0)],
    )?;
    write_active_draft(&store, "This block overflows")?;

    report("confirm", store.confirm_comments().await);

    if !cli.fail_confirm {
        if let Some(first) = store.confirmed_comments().first().cloned() {
            let mut scope = CommentScope::new(&store, first, None);
            scope.toggle_resolving();
        }
        report("resolve", store.resolve_comments().await);
    }

    let state = store.snapshot();
    let output = serde_json::json!({
        "overlayState": state.overlay_state,
        "focussedComment": state.focussed_comment,
        "comments": state.comments,
    });
    let text = serde_json::to_string_pretty(&output).map_err(|err| err.to_string())?;
    println!("{text}");
    info!(
        "event=playground_done module=cli status=ok comments={}",
        state.comments.len()
    );
    Ok(())
}

/// Replays one pointer gesture through `path` (first point is the press).
fn place(
    store: &CommentStore,
    surface: &mut OverlaySurface,
    bounds: &ContentBounds,
    path: &[(f64, f64)],
) -> Result<(), String> {
    let (&(down_x, down_y), rest) = path.split_first().ok_or("empty gesture")?;
    match surface.pointer_down(store, PointerEvent::new(1, down_x, down_y), bounds) {
        PointerDown::Captured(_) => {}
        PointerDown::Blocked(warning) => return Err(warning.to_string()),
        PointerDown::Ignored => return Err("overlay is inactive".to_string()),
    }
    for &(x, y) in rest {
        surface.pointer_move(PointerEvent::new(1, x, y), bounds);
    }
    let &(up_x, up_y) = rest.last().unwrap_or(&(down_x, down_y));
    surface.pointer_up(store, PointerEvent::new(1, up_x, up_y), bounds);
    Ok(())
}

fn write_active_draft(store: &CommentStore, text: &str) -> Result<(), String> {
    let comment = store.active_comment().ok_or("no comment is being edited")?;
    let mut scope = CommentScope::new(store, comment, None);
    scope.set_draft(text);
    if scope.confirm() {
        Ok(())
    } else {
        Err("draft rejected".to_string())
    }
}

fn report(step: &str, result: TxResult) {
    match result.error {
        None => eprintln!("{step}: ok"),
        Some(err) => eprintln!("{step}: failed code={} message={}", err.code(), err.message()),
    }
}
