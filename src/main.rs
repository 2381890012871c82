use std::fs::File;
use std::io::BufWriter;
use std::sync::Arc;

use anyhow::Context;
use clap::{Arg, Command};
use eframe::egui;

use mind_map::fetch::{FileSource, MindMapSource};
use mind_map::graph_utils::builder::build_graph;
use mind_map::gui::frontend::MindMapApp;
use mind_map::persistence::settings::AppSettings;

fn source_from_args(matches: &clap::ArgMatches, settings: &AppSettings) -> anyhow::Result<Arc<dyn MindMapSource>> {
    match matches.get_one::<String>("file") {
        Some(path) => Ok(Arc::new(FileSource::new(path))),
        None => api_source(matches, settings),
    }
}

#[cfg(feature = "http")]
fn api_source(matches: &clap::ArgMatches, settings: &AppSettings) -> anyhow::Result<Arc<dyn MindMapSource>> {
    let base_url = matches.get_one::<String>("base_url").unwrap_or(&settings.api_base_url);
    let token = matches.get_one::<String>("token").cloned().or_else(|| settings.api_token.clone());
    let source = mind_map::fetch::HttpSource::new(base_url, token).context("building HTTP client")?;
    Ok(Arc::new(source))
}

#[cfg(not(feature = "http"))]
fn api_source(_matches: &clap::ArgMatches, _settings: &AppSettings) -> anyhow::Result<Arc<dyn MindMapSource>> {
    anyhow::bail!("built without the `http` feature; pass --file")
}

fn export_json(source: &dyn MindMapSource, matter_id: &str, settings: &AppSettings, out: &str) -> anyhow::Result<()> {
    let payload = source.fetch(matter_id).map_err(|e| anyhow::anyhow!(e.user_message()))?;
    let built = build_graph(
        &payload.catalog,
        &payload.relationships,
        &settings.default_visibility,
        &settings.build_options(),
    );
    let f = File::create(out).with_context(|| format!("creating {}", out))?;
    serde_json::to_writer_pretty(BufWriter::new(f), &built.graph)?;
    log::info!(
        "exported {} nodes / {} edges in {} components to {}",
        built.graph.node_count(),
        built.graph.edge_count(),
        built.summary.components,
        out
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let matches = Command::new("Mind-Map")
        .about("Knowledge-graph view of the entities behind a matter")
        .arg(Arg::new("matter").long("matter").value_name("ID").required_unless_present("file").help("Matter to load"))
        .arg(Arg::new("file").long("file").value_name("PATH").help("Read a saved mind-map response instead of calling the API"))
        .arg(Arg::new("base_url").long("base-url").value_name("URL").help("Override the API base URL from settings"))
        .arg(Arg::new("token").long("token").value_name("TOKEN").help("Bearer token for the API"))
        .arg(Arg::new("export_json").long("export-json").value_name("PATH").help("Build the graph, write it as JSON and exit"))
        .get_matches();

    let settings = AppSettings::load().unwrap_or_else(|e| {
        log::warn!("could not load settings from {}: {}; using defaults", AppSettings::settings_dir().display(), e);
        AppSettings::default()
    });
    // a saved response has no matter id of its own; name it after the file
    let matter_id = matches
        .get_one::<String>("matter")
        .or_else(|| matches.get_one::<String>("file"))
        .cloned()
        .unwrap_or_default();
    let source = source_from_args(&matches, &settings)?;

    if let Some(out) = matches.get_one::<String>("export_json") {
        return export_json(source.as_ref(), &matter_id, &settings, out);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1300.0, 760.0])
            .with_min_inner_size([700.0, 420.0])
            .with_resizable(true),
        ..Default::default()
    };
    eframe::run_native(
        "Mind-Map",
        options,
        Box::new(move |_cc| Ok(Box::new(MindMapApp::new(source, matter_id, settings)) as Box<dyn eframe::App>)),
    )
    .map_err(|e| anyhow::anyhow!("{}", e))
}
