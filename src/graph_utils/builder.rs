use super::catalog::{EntityCatalog, Relationship};
use super::cluster::{self, Components, LayoutSeedConfig};
use super::edges::{EdgeBuildStats, EdgeBuilder};
use super::graph::MindMapGraph;
use super::nodes::{LabelOptions, NodeBuildStats, NodeBuilder};
use super::visibility::VisibilityFilter;

#[derive(Copy, Clone, Debug, Default)]
pub struct BuildOptions {
    pub labels: LabelOptions,
    pub layout: LayoutSeedConfig,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub nodes: NodeBuildStats,
    pub edges: EdgeBuildStats,
    pub components: usize,
}

pub struct BuiltGraph {
    pub graph: MindMapGraph,
    pub components: Components,
    pub summary: BuildSummary,
}

/// Full rebuild: nodes, then edges between materialized nodes, then component
/// clustering and seed positions. Nothing from a previous build is reused.
pub fn build_graph(
    catalog: &EntityCatalog,
    relationships: &[Relationship],
    filter: &VisibilityFilter,
    options: &BuildOptions,
) -> BuiltGraph {
    let mut graph = MindMapGraph::new();
    let nodes = NodeBuilder::new(catalog, filter, options.labels).build(&mut graph);
    let edges = EdgeBuilder::new(catalog).build(relationships, &nodes.links, &mut graph);

    let components = cluster::connected_components(&graph);
    let seeds = cluster::seed_positions(&components, &options.layout);
    graph.apply_seeds(&seeds);

    let summary = BuildSummary { nodes: nodes.stats, edges, components: components.len() };
    log::info!(
        "mind map built: {} nodes ({} synthetic), {} edges, {} components",
        graph.node_count(),
        summary.nodes.synthetic,
        graph.edge_count(),
        summary.components
    );
    log::debug!(
        "build detail: {} addresses without links, {} edges dropped, {} duplicate edges",
        summary.nodes.skipped_addresses,
        summary.edges.dropped,
        summary.edges.duplicates
    );
    BuiltGraph { graph, components, summary }
}
