pub mod graph_builder;

pub use graph_builder::GraphBuilder;

#[cfg(test)]
pub(crate) mod test_support;
