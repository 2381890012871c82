use super::catalog::{Entity, EntityCatalog, Relationship};
use super::format::format_date;
use super::graph::{EdgeDescriptor, MindMapGraph};
use super::style::{self, LinkFacts};

/// An edge implied by an entity's own data rather than a relationship record
/// (company -> debt figure, company -> court case, entity -> address).
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedLink {
    pub from: String,
    pub to: String,
    pub kind: &'static str,
    pub label: String,
    // fixed colour for links that mirror their synthetic node
    pub color: Option<&'static str>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeBuildStats {
    pub relationships: usize,
    pub derived: usize,
    // endpoint hidden or unknown
    pub dropped: usize,
    // same (from, to, type, label) already drawn
    pub duplicates: usize,
}

/// Edge id from (from, to, type, normalized label). Two different roles between
/// the same pair get two ids; a repeated tuple collapses to one.
pub fn edge_id(from: &str, to: &str, kind: &str, label: &str) -> String {
    let normalized: String = label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();
    format!("{}->{}:{}:{}", from, to, kind.to_lowercase(), normalized)
}

/// Label shown on a bankruptcy edge, derived from the bankruptcy entity itself.
pub fn bankruptcy_label(catalog: &EntityCatalog, rel: &Relationship) -> Option<String> {
    let target = [rel.to.as_str(), rel.from.as_str()]
        .into_iter()
        .find_map(|id| match catalog.get(id) {
            Some(Entity::Bankruptcy(b)) => Some(b),
            _ => None,
        })?;
    let from = target.from.as_deref().map(str::trim).filter(|f| !f.is_empty());
    Some(match from {
        Some(date) if target.has_bankruptcy => format!("from - {}", format_date(date)),
        _ => "no bankruptcy".to_string(),
    })
}

pub fn relationship_label(catalog: &EntityCatalog, rel: &Relationship) -> String {
    let base = if rel.kind == "bankruptcy" {
        bankruptcy_label(catalog, rel).unwrap_or_else(|| rel.label.clone())
    } else {
        rel.label.clone()
    };
    if !rel.uncertain {
        return base;
    }
    match rel.similarity_percentage {
        Some(pct) => format!("{} ({:.0}%)", base, pct.clamp(0.0, 100.0)),
        None => format!("{} (?)", base),
    }
}

pub struct EdgeBuilder<'a> {
    catalog: &'a EntityCatalog,
    stats: EdgeBuildStats,
}

impl<'a> EdgeBuilder<'a> {
    pub fn new(catalog: &'a EntityCatalog) -> Self {
        Self { catalog, stats: EdgeBuildStats::default() }
    }

    pub fn build(mut self, relationships: &[Relationship], derived: &[DerivedLink], graph: &mut MindMapGraph) -> EdgeBuildStats {
        for link in derived {
            let facts = LinkFacts { kind: link.kind, label: &link.label, uncertain: false };
            let edge = EdgeDescriptor {
                id: edge_id(&link.from, &link.to, link.kind, &link.label),
                from: link.from.clone(),
                to: link.to.clone(),
                label: link.label.clone(),
                color: link.color.unwrap_or_else(|| style::edge_color(&facts)),
                dash: style::edge_dash(&facts),
                width: style::edge_width(&facts),
            };
            if self.push(graph, edge) {
                self.stats.derived += 1;
            }
        }
        for rel in relationships {
            let facts = LinkFacts { kind: &rel.kind, label: &rel.label, uncertain: rel.uncertain };
            let label = relationship_label(self.catalog, rel);
            let edge = EdgeDescriptor {
                id: edge_id(&rel.from, &rel.to, &rel.kind, &label),
                from: rel.from.clone(),
                to: rel.to.clone(),
                label,
                color: style::edge_color(&facts),
                dash: style::edge_dash(&facts),
                width: style::edge_width(&facts),
            };
            if self.push(graph, edge) {
                self.stats.relationships += 1;
            }
        }
        self.stats
    }

    fn push(&mut self, graph: &mut MindMapGraph, edge: EdgeDescriptor) -> bool {
        if !graph.contains_node(&edge.from) || !graph.contains_node(&edge.to) {
            self.stats.dropped += 1;
            return false;
        }
        if graph.contains_edge(&edge.id) {
            self.stats.duplicates += 1;
            return false;
        }
        graph.add_edge(edge)
    }
}
