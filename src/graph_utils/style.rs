// Visual encoding for the mind map. Colour choice is table driven: each
// category has an ordered list of (predicate -> style) rules, first match wins.

use serde::Serialize;

use super::catalog::{CompanyRecord, PersonRecord};

pub mod palette {
    pub const BLUE: &str = "#2B7CE9";
    pub const BLUE_LIGHT: &str = "#97C2FC";
    pub const GOOD_BG: &str = "#B3E5FC";
    pub const GOOD_BORDER: &str = "#4FC3F7";
    pub const RED: &str = "#E53935";
    pub const RED_LIGHT: &str = "#FB7E81";
    pub const GRAY: &str = "#9E9E9E";
    pub const GRAY_LIGHT: &str = "#D3D3D3";
    pub const TEAL: &str = "#00897B";
    pub const TEAL_LIGHT: &str = "#80CBC4";
    pub const PURPLE: &str = "#8E24AA";
    pub const PURPLE_LIGHT: &str = "#CE93D8";
    pub const GREEN: &str = "#43A047";
    pub const GREEN_LIGHT: &str = "#A5D6A7";
    pub const ORANGE: &str = "#FB8C00";
    pub const ORANGE_LIGHT: &str = "#FFCC80";
    pub const YELLOW: &str = "#FBC02D";
    pub const YELLOW_LIGHT: &str = "#FFF59D";
    pub const TEXT: &str = "#212121";
}

use palette::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    Box,
    Ellipse,
    Dot,
    Diamond,
    Hexagon,
    Square,
    Triangle,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NodeColor {
    pub background: &'static str,
    pub border: &'static str,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct FontSpec {
    pub size: f32,
    pub color: &'static str,
    pub bold: bool,
}

const FONT: FontSpec = FontSpec { size: 14.0, color: TEXT, bold: false };
const FONT_BOLD: FontSpec = FontSpec { size: 14.0, color: TEXT, bold: true };
const FONT_SMALL: FontSpec = FontSpec { size: 12.0, color: TEXT, bold: false };

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct NodeStyle {
    pub shape: NodeShape,
    pub color: NodeColor,
    pub font: FontSpec,
    pub size: f32,
}

const fn style(shape: NodeShape, background: &'static str, border: &'static str, font: FontSpec, size: f32) -> NodeStyle {
    NodeStyle { shape, color: NodeColor { background, border }, font, size }
}

pub struct StyleRule<T> {
    pub applies: fn(&T) -> bool,
    pub style: NodeStyle,
}

/// Evaluate `rules` top to bottom and return the first matching rule.
pub fn first_match<'a, T>(rules: &'a [StyleRule<T>], subject: &T) -> Option<&'a StyleRule<T>> {
    rules.iter().find(|r| (r.applies)(subject))
}

/// Style of the first matching rule; the last rule of a table is its catch-all.
pub fn resolve<T>(rules: &[StyleRule<T>], subject: &T) -> NodeStyle {
    first_match(rules, subject)
        .or(rules.last())
        .map(|r| r.style)
        .unwrap_or(FALLBACK_STYLE)
}

const FALLBACK_STYLE: NodeStyle = style(NodeShape::Dot, BLUE_LIGHT, BLUE, FONT, 20.0);

pub fn has_positive_debt(c: &CompanyRecord) -> bool {
    c.ato_data.as_ref().is_some_and(|d| d.amount > 0.0)
}

fn company_alert(c: &CompanyRecord) -> bool { has_positive_debt(c) || !c.court_cases.is_empty() }
fn company_clear_debt(c: &CompanyRecord) -> bool { c.ato_data.as_ref().is_some_and(|d| d.amount == 0.0) }
fn company_ceased(c: &CompanyRecord) -> bool { c.status.to_lowercase().contains("ceased") }
fn always<T>(_: &T) -> bool { true }

pub const COMPANY_RULES: &[StyleRule<CompanyRecord>] = &[
    StyleRule { applies: company_alert, style: style(NodeShape::Box, RED_LIGHT, RED, FONT_BOLD, 30.0) },
    StyleRule { applies: company_clear_debt, style: style(NodeShape::Box, GOOD_BG, GOOD_BORDER, FONT_BOLD, 30.0) },
    StyleRule { applies: company_ceased, style: style(NodeShape::Box, GRAY_LIGHT, GRAY, FONT_BOLD, 30.0) },
    StyleRule { applies: always, style: style(NodeShape::Box, BLUE_LIGHT, BLUE, FONT_BOLD, 30.0) },
];

fn person_ceased(p: &PersonRecord) -> bool { p.roles.iter().any(|r| r.is_former()) }

pub const PERSON_RULES: &[StyleRule<PersonRecord>] = &[
    StyleRule { applies: person_ceased, style: style(NodeShape::Ellipse, GRAY_LIGHT, GRAY, FONT, 25.0) },
    StyleRule { applies: always, style: style(NodeShape::Ellipse, GREEN_LIGHT, GREEN, FONT, 25.0) },
];

pub const SHAREHOLDER_STYLE: NodeStyle = style(NodeShape::Box, ORANGE_LIGHT, ORANGE, FONT, 25.0);
pub const ADDRESS_ACTIVE_STYLE: NodeStyle = style(NodeShape::Hexagon, YELLOW_LIGHT, YELLOW, FONT_SMALL, 20.0);
pub const ADDRESS_CEASED_STYLE: NodeStyle = style(NodeShape::Hexagon, GRAY_LIGHT, GRAY, FONT_SMALL, 20.0);
pub const BANKRUPT_STYLE: NodeStyle = style(NodeShape::Diamond, RED_LIGHT, RED, FONT_SMALL, 22.0);
pub const NOT_BANKRUPT_STYLE: NodeStyle = style(NodeShape::Diamond, GREEN_LIGHT, GREEN, FONT_SMALL, 22.0);
pub const DEBT_CLEAR_STYLE: NodeStyle = style(NodeShape::Square, TEAL_LIGHT, TEAL, FONT_SMALL, 20.0);
pub const DEBT_OWING_STYLE: NodeStyle = style(NodeShape::Square, RED_LIGHT, RED, FONT_SMALL, 20.0);
pub const COURT_CASE_STYLE: NodeStyle = style(NodeShape::Triangle, PURPLE_LIGHT, PURPLE, FONT_SMALL, 20.0);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DashPattern {
    Solid,
    Dashed,
    // short dash / long gap, in canvas units
    Dotted,
}

impl DashPattern {
    /// (dash, gap) lengths; `None` for a solid stroke.
    pub fn segments(self) -> Option<(f32, f32)> {
        match self {
            DashPattern::Solid => None,
            DashPattern::Dashed => Some((10.0, 6.0)),
            DashPattern::Dotted => Some((2.0, 6.0)),
        }
    }
}

pub const EDGE_WIDTH: f32 = 2.0;
pub const EDGE_WIDTH_UNCERTAIN: f32 = 1.5;

/// The facts an edge is styled from: relationship type, label, certainty.
#[derive(Copy, Clone, Debug)]
pub struct LinkFacts<'a> {
    pub kind: &'a str,
    pub label: &'a str,
    pub uncertain: bool,
}

impl LinkFacts<'_> {
    pub fn is_former(&self) -> bool {
        [self.kind, self.label].iter().any(|s| {
            let s = s.to_lowercase();
            s.contains("former") || s.contains("ceased") || s.contains("past")
        })
    }
}

pub struct EdgeColorRule {
    pub applies: fn(&LinkFacts) -> bool,
    pub color: &'static str,
}

fn link_ppsr(l: &LinkFacts) -> bool { l.kind == "ppsr_security" || l.kind == "ppsr_director" }
fn link_bankruptcy(l: &LinkFacts) -> bool { l.kind == "bankruptcy" }
fn link_former(l: &LinkFacts) -> bool { l.is_former() }
fn link_any(_: &LinkFacts) -> bool { true }

pub const EDGE_COLOR_RULES: &[EdgeColorRule] = &[
    EdgeColorRule { applies: link_ppsr, color: PURPLE },
    EdgeColorRule { applies: link_bankruptcy, color: RED },
    EdgeColorRule { applies: link_former, color: GRAY },
    EdgeColorRule { applies: link_any, color: BLUE },
];

pub fn edge_color(facts: &LinkFacts) -> &'static str {
    EDGE_COLOR_RULES
        .iter()
        .find(|r| (r.applies)(facts))
        .map(|r| r.color)
        .unwrap_or(BLUE)
}

pub fn edge_dash(facts: &LinkFacts) -> DashPattern {
    if facts.uncertain {
        DashPattern::Dotted
    } else if facts.is_former() {
        DashPattern::Dashed
    } else {
        DashPattern::Solid
    }
}

pub fn edge_width(facts: &LinkFacts) -> f32 {
    if facts.uncertain { EDGE_WIDTH_UNCERTAIN } else { EDGE_WIDTH }
}
