mod app;

use std::path::PathBuf;

use clap::Parser;
use code_graph_viewer::RenderOptions;
use code_graph_viewer::session::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Graph document (JSON) to display
    graph: PathBuf,

    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: f32,

    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: f32,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let render_options = RenderOptions {
        width: Some(args.width),
        height: Some(args.height),
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height + app::TOP_BAR_HEIGHT]),
        ..Default::default()
    };

    tracing::info!(path = %args.graph.display(), "starting viewer");

    eframe::run_native(
        "code-graph-viewer",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ViewerApp::new(
                cc,
                args.graph.clone(),
                render_options,
            )))
        }),
    )
    .map_err(|error| anyhow::anyhow!("viewer failed: {error}"))
}
