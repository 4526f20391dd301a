mod shortest_path_tree;
mod state;

pub(crate) use shortest_path_tree::shortest_path_tree;
