use std::collections::HashSet;

use super::catalog::{
    AddressRecord, BankruptcyRecord, Category, CompanyRecord, CourtCase, Entity, EntityCatalog,
    PersonRecord, PersonRole, RoleKind, ShareholderRecord,
};
use super::edges::DerivedLink;
use super::format::{TooltipHtml, format_currency};
use super::graph::{MindMapGraph, NodeDescriptor, NodeOrigin};
use super::style::{
    self, ADDRESS_ACTIVE_STYLE, ADDRESS_CEASED_STYLE, BANKRUPT_STYLE, COMPANY_RULES, COURT_CASE_STYLE,
    DEBT_CLEAR_STYLE, DEBT_OWING_STYLE, NOT_BANKRUPT_STYLE, NodeStyle, PERSON_RULES, SHAREHOLDER_STYLE,
};
use super::text_wrap::{truncate_with_ellipsis, wrap};
use super::visibility::VisibilityFilter;

#[derive(Copy, Clone, Debug)]
pub struct LabelOptions {
    pub wrap_width: usize,
    pub address_max_chars: usize,
}

impl Default for LabelOptions {
    fn default() -> Self { Self { wrap_width: 20, address_max_chars: 25 } }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeBuildStats {
    pub primary: usize,
    pub synthetic: usize,
    pub skipped_addresses: usize,
}

pub struct NodeBuildOutput {
    pub links: Vec<DerivedLink>,
    pub stats: NodeBuildStats,
}

pub fn debt_node_id(company_id: &str) -> String { format!("ato_{}", company_id) }

/// Identity of a court-case node: the case UUID when present, otherwise the
/// owning company and the case's position in its list.
pub fn court_case_node_id(company_id: &str, index: usize, case: &CourtCase) -> String {
    match case.uuid.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
        Some(uuid) => format!("case_{}", uuid),
        None => format!("case_{}_{}", company_id, index),
    }
}

/// One build pass over the catalog. The court-case guard set lives for the
/// whole pass, so a case shared by several companies yields one node.
pub struct NodeBuilder<'a> {
    catalog: &'a EntityCatalog,
    filter: &'a VisibilityFilter,
    options: LabelOptions,
    seen_cases: HashSet<String>,
    links: Vec<DerivedLink>,
    stats: NodeBuildStats,
}

impl<'a> NodeBuilder<'a> {
    pub fn new(catalog: &'a EntityCatalog, filter: &'a VisibilityFilter, options: LabelOptions) -> Self {
        Self {
            catalog,
            filter,
            options,
            seen_cases: HashSet::new(),
            links: Vec::new(),
            stats: NodeBuildStats::default(),
        }
    }

    pub fn build(mut self, graph: &mut MindMapGraph) -> NodeBuildOutput {
        // Addresses go last: they only materialize next to an existing node.
        let order = [
            Category::Companies,
            Category::Persons,
            Category::Shareholders,
            Category::Bankruptcies,
            Category::Addresses,
        ];
        let catalog = self.catalog;
        for category in order {
            if !self.filter.is_visible(category) {
                continue;
            }
            for entity in catalog.by_category(category) {
                match entity {
                    Entity::Company(c) => self.company(graph, c),
                    Entity::Person(p) => self.person(graph, p),
                    Entity::Shareholder(s) => self.shareholder(graph, s),
                    Entity::Bankruptcy(b) => self.bankruptcy(graph, b),
                    Entity::Address(a) => self.address(graph, a),
                }
            }
        }
        NodeBuildOutput { links: self.links, stats: self.stats }
    }

    fn wrap(&self, text: &str) -> String { wrap(text, self.options.wrap_width) }

    fn primary(&mut self, graph: &mut MindMapGraph, node: NodeDescriptor) -> bool {
        let added = graph.add_node(node);
        if added {
            self.stats.primary += 1;
        }
        added
    }

    fn synthetic(&mut self, graph: &mut MindMapGraph, node: NodeDescriptor) -> bool {
        let added = graph.add_node(node);
        if added {
            self.stats.synthetic += 1;
        }
        added
    }

    fn company(&mut self, graph: &mut MindMapGraph, c: &CompanyRecord) {
        let rule = style::resolve(COMPANY_RULES, c);
        let label = if c.acn.trim().is_empty() {
            self.wrap(&c.name)
        } else {
            self.wrap(&format!("{}\nACN {}", c.name, c.acn.trim()))
        };
        let mut tip = TooltipHtml::new(&c.name)
            .subtitle("Company")
            .required("ACN", &c.acn)
            .required("Status", &c.status);
        if let Some(ato) = &c.ato_data {
            tip = tip.required("ATO Debt", &format_currency(ato.amount));
        }
        if !c.court_cases.is_empty() {
            tip = tip.required("Court Cases", &c.court_cases.len().to_string());
        }
        let node = descriptor(&c.id, label, tip.finish(), rule, Category::Companies, NodeOrigin::Entity);
        if !self.primary(graph, node) {
            return;
        }

        if let Some(ato) = &c.ato_data {
            let id = debt_node_id(&c.id);
            let clear = ato.amount == 0.0;
            let debt_style = if clear { DEBT_CLEAR_STYLE } else { DEBT_OWING_STYLE };
            let label = self.wrap(&format!("ATO Debt\n{}", format_currency(ato.amount)));
            let tip = TooltipHtml::new("ATO Debt")
                .subtitle(&c.name)
                .required("Amount", &format_currency(ato.amount))
                .field("Status", ato.status.as_deref())
                .date("Date", ato.date.as_deref())
                .date("Updated", ato.updated_at.as_deref())
                .finish();
            if self.synthetic(graph, descriptor(&id, label, tip, debt_style, Category::Companies, NodeOrigin::Debt)) {
                self.links.push(DerivedLink {
                    from: c.id.clone(),
                    to: id,
                    kind: "ato",
                    label: "ATO".to_string(),
                    color: Some(debt_style.color.border),
                });
            }
        }

        for (index, case) in c.court_cases.iter().enumerate() {
            let id = court_case_node_id(&c.id, index, case);
            if self.seen_cases.insert(id.clone()) {
                let title = case.case_type.as_deref().unwrap_or("Court Case");
                let label = match case.case_number.as_deref() {
                    Some(n) if !n.trim().is_empty() => self.wrap(&format!("{}\n{}", title, n.trim())),
                    _ => self.wrap(title),
                };
                let tip = TooltipHtml::new("Court Case")
                    .field("Case Number", case.case_number.as_deref())
                    .field("Type", case.case_type.as_deref())
                    .field("Court", case.court_name.as_deref())
                    .field("State", case.state.as_deref())
                    .field("Party Role", case.party_role.as_deref())
                    .date("Notified", case.notification_time.as_deref())
                    .link("Source", case.url.as_deref())
                    .finish();
                self.synthetic(graph, descriptor(&id, label, tip, COURT_CASE_STYLE, Category::Companies, NodeOrigin::CourtCase));
            }
            if graph.contains_node(&id) {
                let label = case
                    .case_number
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .unwrap_or("Court Case")
                    .to_string();
                self.links.push(DerivedLink {
                    from: c.id.clone(),
                    to: id,
                    kind: "court_case",
                    label,
                    color: Some(COURT_CASE_STYLE.color.border),
                });
            }
        }
    }

    fn person(&mut self, graph: &mut MindMapGraph, p: &PersonRecord) {
        let rule = style::resolve(PERSON_RULES, p);
        let roles = role_summary(&p.roles);
        let label = if roles.is_empty() { self.wrap(&p.name) } else { self.wrap(&format!("{}\n{}", p.name, roles)) };
        let tip = TooltipHtml::new(&p.name)
            .subtitle("Person")
            .field("Roles", Some(roles.as_str()))
            .date("Date of Birth", p.dob.as_deref())
            .finish();
        self.primary(graph, descriptor(&p.id, label, tip, rule, Category::Persons, NodeOrigin::Entity));
    }

    fn shareholder(&mut self, graph: &mut MindMapGraph, s: &ShareholderRecord) {
        let shares = s.shares.as_ref().map(|v| v.to_string());
        let tip = TooltipHtml::new(&s.name)
            .subtitle("Shareholder")
            .field("Shares", shares.as_deref())
            .finish();
        let label = self.wrap(&s.name);
        self.primary(graph, descriptor(&s.id, label, tip, SHAREHOLDER_STYLE, Category::Shareholders, NodeOrigin::Entity));
    }

    fn bankruptcy(&mut self, graph: &mut MindMapGraph, b: &BankruptcyRecord) {
        let node_style = if b.has_bankruptcy { BANKRUPT_STYLE } else { NOT_BANKRUPT_STYLE };
        let title = if b.name.trim().is_empty() { "Bankruptcy" } else { b.name.as_str() };
        let status = if b.has_bankruptcy { "Bankruptcy recorded" } else { "No bankruptcy" };
        let tip = TooltipHtml::new(title)
            .subtitle("Bankruptcy Check")
            .required("Status", status)
            .date("From", b.from.as_deref())
            .field("Extract", b.extract_id.as_deref())
            .finish();
        // no text label: the connecting edge carries it
        self.primary(graph, descriptor(&b.id, String::new(), tip, node_style, Category::Bankruptcies, NodeOrigin::Entity));
    }

    fn address(&mut self, graph: &mut MindMapGraph, a: &AddressRecord) {
        let linked: Vec<&String> = a.linked_entity_ids.iter().filter(|id| graph.contains_node(id)).collect();
        if linked.is_empty() {
            log::debug!("address '{}' has no materialized link, skipped", a.id);
            self.stats.skipped_addresses += 1;
            return;
        }
        let ceased = a.is_ceased();
        let street = a.address.trim();
        let short = if street.chars().count() > self.options.address_max_chars {
            match a.suburb.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
                Some(suburb) => suburb.to_string(),
                None => truncate_with_ellipsis(street, self.options.address_max_chars),
            }
        } else {
            street.to_string()
        };
        let label = self.wrap(&short);
        let tip = TooltipHtml::new(if street.is_empty() { "Address" } else { street })
            .subtitle(if ceased { "Former Address" } else { "Address" })
            .field("Suburb", a.suburb.as_deref())
            .field("State", a.state.as_deref())
            .field("Postcode", a.postcode.as_deref())
            .field("Status", a.status.as_deref())
            .date("From", a.start_date.as_deref())
            .date("To", a.end_date.as_deref())
            .finish();
        let node_style = if ceased { ADDRESS_CEASED_STYLE } else { ADDRESS_ACTIVE_STYLE };
        if !self.primary(graph, descriptor(&a.id, label, tip, node_style, Category::Addresses, NodeOrigin::Entity)) {
            return;
        }
        let link_label = if ceased { "Former Address" } else { "Address" };
        for from in linked {
            self.links.push(DerivedLink {
                from: from.clone(),
                to: a.id.clone(),
                kind: "address",
                label: link_label.to_string(),
                color: None,
            });
        }
    }
}

fn descriptor(id: &str, label: String, tooltip_html: String, s: NodeStyle, category: Category, origin: NodeOrigin) -> NodeDescriptor {
    NodeDescriptor {
        id: id.to_string(),
        label,
        tooltip_html,
        shape: s.shape,
        color: s.color,
        font: s.font,
        size: s.size,
        category,
        origin,
        seed: None,
    }
}

pub fn role_label(role: &PersonRole) -> String {
    let former = role.is_former();
    match role.kind {
        RoleKind::Director if former => "Former Director".to_string(),
        RoleKind::Director => "Director".to_string(),
        RoleKind::Officeholder => named_role(role, "Office Holder", former),
        RoleKind::Secretary => "Secretary".to_string(),
        RoleKind::Other => named_role(role, "Officer", former),
    }
}

// Upstream role name when present, else `fallback`
fn named_role(role: &PersonRole, fallback: &str, former: bool) -> String {
    let name = role.role.as_deref().map(str::trim).filter(|r| !r.is_empty()).unwrap_or(fallback);
    if former && !name.to_lowercase().starts_with("former") {
        format!("Former {}", name)
    } else {
        name.to_string()
    }
}

/// Comma separated, de-duplicated role list in first-seen order.
pub fn role_summary(roles: &[PersonRole]) -> String {
    let mut seen: HashSet<String> = HashSet::new();
    roles
        .iter()
        .map(role_label)
        .filter(|l| seen.insert(l.clone()))
        .collect::<Vec<_>>()
        .join(", ")
}
