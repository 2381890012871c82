pub mod builder;
pub mod catalog;
pub mod cluster;
pub mod edges;
pub mod format;
pub mod graph;
pub mod nodes;
pub mod style;
pub mod text_wrap;
pub mod visibility;
