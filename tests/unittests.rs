use mind_map::graph_utils::builder::{BuildOptions, BuiltGraph, build_graph};
use mind_map::graph_utils::catalog::{
    AtoData, Category, CompanyRecord, EntityCatalog, EntitySet, PersonRole, Relationship, RoleKind,
};
use mind_map::graph_utils::cluster::{LayoutSeedConfig, connected_components, seed_positions};
use mind_map::graph_utils::edges::edge_id;
use mind_map::graph_utils::format::{format_currency, format_date};
use mind_map::graph_utils::graph::{EdgeDescriptor, MindMapGraph};
use mind_map::graph_utils::nodes::{court_case_node_id, role_summary};
use mind_map::graph_utils::style::{self, COMPANY_RULES, DashPattern, palette};
use mind_map::graph_utils::text_wrap::{truncate_with_ellipsis, wrap};
use mind_map::graph_utils::visibility::VisibilityFilter;
use serde_json::json;

fn catalog(entities: serde_json::Value) -> EntityCatalog {
    let set: EntitySet = serde_json::from_value(entities).expect("entity fixture should parse");
    EntityCatalog::from_entity_set(set)
}

fn rels(value: serde_json::Value) -> Vec<Relationship> {
    serde_json::from_value(value).expect("relationship fixture should parse")
}

fn build(entities: serde_json::Value, relationships: serde_json::Value) -> BuiltGraph {
    build_with(entities, relationships, VisibilityFilter::default())
}

fn build_with(entities: serde_json::Value, relationships: serde_json::Value, filter: VisibilityFilter) -> BuiltGraph {
    let cat = catalog(entities);
    build_graph(&cat, &rels(relationships), &filter, &BuildOptions::default())
}

fn edge<'a>(graph: &'a MindMapGraph, from: &str, to: &str) -> &'a EdgeDescriptor {
    graph
        .edges_between(from, to)
        .next()
        .unwrap_or_else(|| panic!("expected an edge {} -> {}", from, to))
}

fn company(ato: Option<f64>, status: &str, cases: usize) -> CompanyRecord {
    CompanyRecord {
        id: "C".into(),
        name: "Acme".into(),
        status: status.into(),
        ato_data: ato.map(|amount| AtoData { amount, ..Default::default() }),
        court_cases: vec![Default::default(); cases],
        ..Default::default()
    }
}

// ---- labels ----

#[test]
fn wrap_packs_words_within_limit() {
    let text = "Acme Holdings International Proprietary Limited";
    let wrapped = wrap(text, 20);
    for line in wrapped.lines() {
        assert!(line.chars().count() <= 20, "line too long: {:?}", line);
    }
    let words: Vec<&str> = wrapped.split_whitespace().collect();
    assert_eq!(words, text.split_whitespace().collect::<Vec<_>>());
}

#[test]
fn wrap_hard_splits_long_tokens_and_keeps_newlines() {
    let wrapped = wrap("ABCDEFGHIJKLMNOPQRSTUVWXY\nACN 123", 10);
    let lines: Vec<&str> = wrapped.lines().collect();
    assert_eq!(lines, vec!["ABCDEFGHIJ", "KLMNOPQRST", "UVWXY", "ACN 123"]);
    assert_eq!(wrap("unchanged text", 0), "unchanged text");
}

#[test]
fn wrap_holds_line_limit_across_inputs_and_widths() {
    let inputs = [
        "Acme Holdings International Proprietary Limited",
        "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
        "Société Générale Ünïcödé Pty",
        "東京都千代田区丸の内 一丁目",
        "ACN 123 456 789\nLevel 12, 1 Collins Street",
        "  leading and   repeated   spaces ",
        "",
    ];
    for text in inputs {
        for limit in [1, 2, 3, 5, 8, 13, 40] {
            let wrapped = wrap(text, limit);
            for line in wrapped.lines() {
                assert!(line.chars().count() <= limit, "{:?} at {} gave line {:?}", text, limit, line);
            }
            // nothing dropped or reordered, whitespace aside
            let kept: String = wrapped.chars().filter(|c| !c.is_whitespace()).collect();
            let original: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            assert_eq!(kept, original, "{:?} at {}", text, limit);
            // when every word fits, words come through whole and in order
            if text.split_whitespace().all(|w| w.chars().count() <= limit) {
                assert_eq!(
                    wrapped.split_whitespace().collect::<Vec<_>>(),
                    text.split_whitespace().collect::<Vec<_>>(),
                    "{:?} at {}",
                    text,
                    limit
                );
            }
            assert!(wrapped.split('\n').count() >= text.split('\n').count());
        }
    }
}

#[test]
fn truncate_marks_the_cut() {
    assert_eq!(truncate_with_ellipsis("short", 10), "short");
    assert_eq!(truncate_with_ellipsis("Level 12 Collins Street", 9), "Level 12...");
}

#[test]
fn dates_and_currency_are_formatted() {
    assert_eq!(format_date("2020-01-15"), "15/01/2020");
    assert_eq!(format_date("2021-07-04T10:00:00Z"), "04/07/2021");
    assert_eq!(format_date("sometime"), "sometime");
    assert_eq!(format_currency(1234.5), "$1,234.50");
    assert_eq!(format_currency(0.0), "$0.00");
    assert_eq!(format_currency(1_000_000.0), "$1,000,000.00");
}

// ---- colour rules ----

#[test]
fn company_colour_follows_rule_priority() {
    let bg = |c: &CompanyRecord| style::resolve(COMPANY_RULES, c).color.background;
    assert_eq!(bg(&company(Some(500.0), "active", 0)), palette::RED_LIGHT);
    assert_eq!(bg(&company(Some(0.0), "active", 0)), palette::GOOD_BG);
    assert_eq!(bg(&company(None, "ceased", 0)), palette::GRAY_LIGHT);
    assert_eq!(bg(&company(None, "active", 0)), palette::BLUE_LIGHT);
    // court exposure outranks a clear debt record and ceased status
    assert_eq!(bg(&company(Some(0.0), "Ceased", 1)), palette::RED_LIGHT);
    assert_eq!(bg(&company(Some(0.0), "ceased", 0)), palette::GOOD_BG);
}

#[test]
fn person_roles_drive_colour_and_label() {
    let built = build(
        json!({"persons": [
            {"id": "P1", "name": "Jane Citizen", "roles": [{"type": "director"}, {"type": "secretary"}, {"type": "director"}]},
            {"id": "P2", "name": "John Former", "roles": [{"type": "director", "originalType": "Former Director"}]}
        ]}),
        json!([]),
    );
    let p1 = built.graph.get_node("P1").unwrap();
    assert_eq!(p1.color.background, palette::GREEN_LIGHT);
    assert!(p1.label.contains("Director, Secretary"), "label was {:?}", p1.label);
    let p2 = built.graph.get_node("P2").unwrap();
    assert_eq!(p2.color.background, palette::GRAY_LIGHT);
    assert!(p2.label.contains("Former Director"));
}

#[test]
fn role_summary_names_office_holders() {
    let roles: Vec<PersonRole> = serde_json::from_value(json!([
        {"type": "officeholder", "role": "Public Officer"},
        {"type": "office_holder", "role": "Chair", "originalType": "ceased"},
        {"type": "officeholder"}
    ]))
    .unwrap();
    assert_eq!(role_summary(&roles), "Public Officer, Former Chair, Office Holder");
}

#[test]
fn unknown_role_types_fall_back_to_their_name() {
    let roles: Vec<PersonRole> = serde_json::from_value(json!([
        {"type": "shareholder"},
        {"type": "liquidator", "role": "Liquidator"},
        {"type": "auditor", "role": "Auditor", "originalType": "Former Auditor"},
        {"type": null, "role": "Agent"},
        {"type": "director"}
    ]))
    .unwrap();
    assert_eq!(roles[0].kind, RoleKind::Other);
    assert_eq!(roles[3].kind, RoleKind::Other);
    assert_eq!(role_summary(&roles), "Officer, Liquidator, Former Auditor, Agent, Director");
}

// ---- graph construction ----

#[test]
fn null_fields_read_as_missing() {
    let built = build(
        json!({
            "companies": [{"id": "C1", "name": "Acme", "acn": null, "status": null, "courtCases": null}],
            "persons": [{"id": "P1", "name": "Jane Citizen", "roles": [{"type": "liquidator", "role": "Liquidator"}]}],
            "addresses": null
        }),
        json!([{"from": "C1", "to": "P1", "type": "director", "label": null, "uncertain": null}]),
    );
    let g = &built.graph;
    let c1 = g.get_node("C1").unwrap();
    assert_eq!(c1.label, "Acme");
    assert!(c1.tooltip_html.contains("ACN: N/A"), "tooltip was {:?}", c1.tooltip_html);
    assert!(c1.tooltip_html.contains("Status: N/A"));
    assert_eq!(c1.color.background, palette::BLUE_LIGHT);
    assert!(g.get_node("P1").unwrap().label.contains("Liquidator"));
    assert_eq!(g.edges_between("C1", "P1").count(), 1);
}

#[test]
fn end_to_end_company_with_clear_debt_and_director() {
    let built = build(
        json!({
            "companies": [{"id": "C1", "name": "Acme Pty Ltd", "status": "active", "atoData": {"amount": 0}}],
            "persons": [{"id": "P1", "name": "Jane Citizen", "roles": [{"type": "director"}]}]
        }),
        json!([{"from": "C1", "to": "P1", "type": "director", "label": "Director"}]),
    );
    let g = &built.graph;
    assert_eq!(built.summary.nodes.primary, 2);
    assert_eq!(built.summary.nodes.synthetic, 1);
    assert_eq!(g.node_count(), 3);
    assert_eq!(g.edge_count(), 2);

    let debt = g.get_node("ato_C1").expect("debt node");
    assert_eq!(debt.color.background, palette::TEAL_LIGHT);
    assert_eq!(debt.color.border, palette::TEAL);
    assert_eq!(g.get_node("C1").unwrap().color.background, palette::GOOD_BG);

    let ato = edge(g, "C1", "ato_C1");
    assert_eq!(ato.label, "ATO");
    assert_eq!(ato.color, "#00897B");
    assert_eq!(ato.dash, DashPattern::Solid);

    let director = edge(g, "C1", "P1");
    assert_eq!(director.label, "Director");
    assert_eq!(director.color, "#2B7CE9");
    assert_eq!(director.dash, DashPattern::Solid);
    assert_eq!(built.summary.components, 1);
}

#[test]
fn owing_debt_node_is_red() {
    let built = build(
        json!({"companies": [{"id": "C1", "name": "Acme", "atoData": {"amount": 1500.25, "status": "Overdue"}}]}),
        json!([]),
    );
    let debt = built.graph.get_node("ato_C1").unwrap();
    assert_eq!(debt.color.background, palette::RED_LIGHT);
    assert!(debt.label.contains("$1,500.25"));
    assert!(debt.tooltip_html.contains("Status: Overdue"));
    assert_eq!(edge(&built.graph, "C1", "ato_C1").color, palette::RED);
}

#[test]
fn shared_court_case_yields_one_node_and_two_edges() {
    let case = json!({"uuid": "U-77", "caseNumber": "NSD123/2021", "caseType": "Winding Up"});
    let built = build(
        json!({"companies": [
            {"id": "C1", "name": "Acme", "courtCases": [case.clone()]},
            {"id": "C2", "name": "Beta", "courtCases": [case]}
        ]}),
        json!([]),
    );
    let g = &built.graph;
    let case_nodes: Vec<_> = g.nodes.iter().filter(|n| n.id.starts_with("case_")).collect();
    assert_eq!(case_nodes.len(), 1);
    assert_eq!(case_nodes[0].id, "case_U-77");
    assert_eq!(edge(g, "C1", "case_U-77").label, "NSD123/2021");
    assert_eq!(edge(g, "C2", "case_U-77").label, "NSD123/2021");
    assert_eq!(edge(g, "C1", "case_U-77").color, palette::PURPLE);
    assert_eq!(g.edge_count(), 2);
    assert_eq!(g.get_node("C1").unwrap().color.background, palette::RED_LIGHT);
}

#[test]
fn shared_case_without_uuid_gets_a_node_per_company() {
    let case = json!({"caseNumber": "NSD9/2020", "caseType": "Winding Up"});
    let built = build(
        json!({"companies": [
            {"id": "C1", "name": "Acme", "courtCases": [case.clone()]},
            {"id": "C2", "name": "Beta", "courtCases": [case]}
        ]}),
        json!([]),
    );
    let g = &built.graph;
    let mut case_ids: Vec<&str> = g.nodes.iter().filter(|n| n.id.starts_with("case_")).map(|n| n.id.as_str()).collect();
    case_ids.sort();
    assert_eq!(case_ids, vec!["case_C1_0", "case_C2_0"]);
    assert_eq!(edge(g, "C1", "case_C1_0").label, "NSD9/2020");
    assert_eq!(edge(g, "C2", "case_C2_0").label, "NSD9/2020");
    assert_eq!(g.edges_between("C1", "case_C2_0").count(), 0);
    assert_eq!(g.edge_count(), 2);
    assert_eq!(built.summary.components, 2);
}

#[test]
fn court_case_without_uuid_is_scoped_to_its_company() {
    let case = Default::default();
    assert_eq!(court_case_node_id("C9", 2, &case), "case_C9_2");
}

#[test]
fn bankruptcy_edges_are_labelled_from_the_record() {
    let entities = |has: bool| {
        json!({
            "persons": [{"id": "P1", "name": "Jane"}],
            "bankruptcies": [{"id": "B1", "name": "Jane", "hasBankruptcy": has, "from": "2020-01-15"}]
        })
    };
    let relationship = json!([{"from": "P1", "to": "B1", "type": "bankruptcy", "label": "Bankruptcy"}]);

    let built = build(entities(true), relationship.clone());
    let e = edge(&built.graph, "P1", "B1");
    assert_eq!(e.label, "from - 15/01/2020");
    assert_eq!(e.color, palette::RED);
    assert_eq!(built.graph.get_node("B1").unwrap().label, "");

    let built = build(entities(false), relationship);
    assert_eq!(edge(&built.graph, "P1", "B1").label, "no bankruptcy");
    assert_eq!(built.graph.get_node("B1").unwrap().color.background, palette::GREEN_LIGHT);
}

#[test]
fn uncertain_matches_are_dotted_and_annotated() {
    let built = build(
        json!({
            "companies": [{"id": "C1", "name": "Acme"}],
            "persons": [{"id": "P1", "name": "Jane"}, {"id": "P2", "name": "Jon"}]
        }),
        json!([
            {"from": "C1", "to": "P1", "type": "director", "label": "Director", "uncertain": true, "similarityPercentage": 87.4},
            {"from": "C1", "to": "P2", "type": "director", "label": "Director", "uncertain": true}
        ]),
    );
    let e1 = edge(&built.graph, "C1", "P1");
    assert_eq!(e1.label, "Director (87%)");
    assert_eq!(e1.dash, DashPattern::Dotted);
    assert!(e1.width < style::EDGE_WIDTH);
    assert_eq!(edge(&built.graph, "C1", "P2").label, "Director (?)");
}

#[test]
fn former_and_ppsr_edges_use_their_colours() {
    let built = build(
        json!({
            "companies": [{"id": "C1", "name": "Acme"}],
            "persons": [{"id": "P1", "name": "Jane"}]
        }),
        json!([
            {"from": "C1", "to": "P1", "type": "director", "label": "Former Director"},
            {"from": "P1", "to": "C1", "type": "ppsr_security", "label": "Secured Party"}
        ]),
    );
    let former = edge(&built.graph, "C1", "P1");
    assert_eq!(former.color, palette::GRAY);
    assert_eq!(former.dash, DashPattern::Dashed);
    assert_eq!(edge(&built.graph, "P1", "C1").color, palette::PURPLE);
}

#[test]
fn parallel_roles_keep_separate_edges_and_repeats_collapse() {
    let built = build(
        json!({
            "companies": [{"id": "C1", "name": "Acme"}],
            "persons": [{"id": "P1", "name": "Jane"}]
        }),
        json!([
            {"from": "C1", "to": "P1", "type": "director", "label": "Director"},
            {"from": "C1", "to": "P1", "type": "secretary", "label": "Secretary"},
            {"from": "C1", "to": "P1", "type": "director", "label": "Director"}
        ]),
    );
    assert_eq!(built.graph.edges_between("C1", "P1").count(), 2);
    assert_eq!(built.summary.edges.duplicates, 1);
    assert_eq!(edge_id("C1", "P1", "Director", " Former   Director "), "C1->P1:director:former_director");
}

#[test]
fn hidden_category_drops_nodes_and_their_edges() {
    let entities = json!({
        "companies": [{"id": "C1", "name": "Acme", "atoData": {"amount": 10}}],
        "persons": [{"id": "P1", "name": "Jane"}],
        "shareholders": [{"id": "S1", "name": "Holdco", "shares": 100}]
    });
    let relationships = json!([
        {"from": "C1", "to": "P1", "type": "director", "label": "Director"},
        {"from": "S1", "to": "C1", "type": "shareholder", "label": "Shareholder"}
    ]);

    let mut filter = VisibilityFilter::default();
    assert!(filter.set(Category::Persons, false));
    assert!(!filter.set(Category::Persons, false), "no change, no rebuild");
    let built = build_with(entities.clone(), relationships.clone(), filter);
    assert!(!built.graph.contains_node("P1"));
    assert_eq!(built.graph.edges_between("C1", "P1").count(), 0);
    assert_eq!(built.graph.edges_between("S1", "C1").count(), 1);
    assert_eq!(built.summary.edges.dropped, 1);

    // hiding companies also hides the debt figure they produce
    filter.toggle(Category::Persons);
    filter.toggle(Category::Companies);
    let built = build_with(entities, relationships, filter);
    assert!(!built.graph.contains_node("C1"));
    assert!(!built.graph.contains_node("ato_C1"));
    assert_eq!(built.graph.edge_count(), 0);
    assert!(built.graph.get_node("S1").unwrap().tooltip_html.contains("Shares: 100"));
}

#[test]
fn addresses_attach_to_visible_entities_only() {
    let entities = json!({
        "companies": [{"id": "C1", "name": "Acme"}],
        "persons": [{"id": "P1", "name": "Jane"}],
        "addresses": [
            {"id": "A1", "address": "1 Short St", "linkedEntityId": "C1", "linkedEntityIds": ["P1", "C1", ""]},
            {"id": "A2", "address": "Level 40, 1 Very Long Collins Street", "suburb": "Melbourne", "endDate": "2019-03-01", "linkedEntityIds": ["P1"]},
            {"id": "A3", "address": "9 Nowhere Rd", "linkedEntityIds": ["X404"]}
        ]
    });

    let built = build(entities.clone(), json!([]));
    let g = &built.graph;
    assert!(!g.contains_node("A3"));
    assert_eq!(built.summary.nodes.skipped_addresses, 1);
    assert_eq!(edge(g, "C1", "A1").label, "Address");
    assert_eq!(edge(g, "P1", "A1").label, "Address");
    assert_eq!(g.degree("A1"), 2);

    let former = g.get_node("A2").unwrap();
    assert_eq!(former.label, "Melbourne");
    assert_eq!(former.color.background, palette::GRAY_LIGHT);
    let link = edge(g, "P1", "A2");
    assert_eq!(link.label, "Former Address");
    assert_eq!(link.dash, DashPattern::Dashed);

    let mut filter = VisibilityFilter::default();
    filter.set(Category::Persons, false);
    let built = build_with(entities, json!([]), filter);
    assert!(built.graph.contains_node("A1"));
    assert!(!built.graph.contains_node("A2"));
    assert_eq!(built.graph.degree("A1"), 1);
}

#[test]
fn catalog_keeps_first_of_duplicate_ids() {
    let cat = catalog(json!({
        "companies": [{"id": "X1", "name": "Acme"}],
        "persons": [{"id": "X1", "name": "Shadow"}, {"id": "P2", "name": "Jane"}]
    }));
    assert_eq!(cat.len(), 2);
    assert_eq!(cat.category_of("X1"), Some(Category::Companies));
    assert_eq!(cat.get("X1").unwrap().name(), "Acme");
    assert_eq!(cat.by_category(Category::Persons).count(), 1);
}

// ---- clustering ----

fn approx(a: f32, b: f32) -> bool { (a - b).abs() < 0.01 }

#[test]
fn disconnected_groups_get_separate_seed_centres() {
    let built = build(
        json!({
            "companies": [{"id": "C1", "name": "Acme"}, {"id": "C2", "name": "Lonely"}],
            "persons": [{"id": "P1", "name": "Jane"}]
        }),
        json!([{"from": "C1", "to": "P1", "type": "director", "label": "Director"}]),
    );
    let comps = &built.components;
    assert_eq!(comps.len(), 2);
    assert_eq!(comps.component_of("C1"), comps.component_of("P1"));
    assert_ne!(comps.component_of("C1"), comps.component_of("C2"));

    let seed = |id: &str| built.graph.get_node(id).and_then(|n| n.seed).expect("seeded");
    let c2 = seed("C2");
    assert!(approx(c2.x, -600.0) && approx(c2.y, 0.0), "singleton sits on its centre: {:?}", c2);
    let (c1, p1) = (seed("C1"), seed("P1"));
    assert!(approx(c1.x, 680.0) && approx(p1.x, 520.0), "{:?} {:?}", c1, p1);
}

#[test]
fn single_component_is_centred_on_origin_with_capped_radius() {
    let persons: Vec<_> = (0..10).map(|i| json!({"id": format!("P{}", i), "name": "P"})).collect();
    let relationships: Vec<_> = (0..10)
        .map(|i| json!({"from": "C1", "to": format!("P{}", i), "type": "director", "label": "Director"}))
        .collect();
    let built = build(
        json!({"companies": [{"id": "C1", "name": "Acme"}], "persons": persons}),
        json!(relationships),
    );
    assert_eq!(built.components.len(), 1);
    let (mut sx, mut sy) = (0.0f32, 0.0f32);
    for node in &built.graph.nodes {
        let p = node.seed.unwrap();
        assert!(approx((p.x * p.x + p.y * p.y).sqrt(), 260.0), "capped radius, got {:?}", p);
        sx += p.x;
        sy += p.y;
    }
    assert!(sx.abs() < 0.1 && sy.abs() < 0.1);
}

#[test]
fn long_chains_do_not_overflow_the_stack() {
    let n = 20_000;
    let persons: Vec<_> = (0..n).map(|i| json!({"id": format!("P{}", i), "name": "P"})).collect();
    let relationships: Vec<_> = (1..n)
        .map(|i| json!({"from": format!("P{}", i - 1), "to": format!("P{}", i), "type": "related", "label": "Related"}))
        .collect();
    let built = build(json!({"persons": persons}), json!(relationships));
    assert_eq!(built.components.len(), 1);
    assert_eq!(built.components.members(0).len(), n);
}

#[test]
fn seeds_are_empty_for_empty_graph() {
    let comps = connected_components(&MindMapGraph::new());
    assert!(comps.is_empty());
    assert!(seed_positions(&comps, &LayoutSeedConfig::default()).is_empty());
}
