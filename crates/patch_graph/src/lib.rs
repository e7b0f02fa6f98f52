mod builtins;
mod graph;
mod registry;

pub use builtins::{install_standard_adapters, standard_registry};
pub use graph::{
    Block, BlockId, BlockTypeId, Direction, Edge, EdgeId, Graph, LensDecl, PortKey, PortName,
    PortRef,
};
pub use registry::{
    AdapterSpec, BlockDef, BlockRegistry, BlockRegistryBuilder, CardinalityMode, Purity, Stability,
};
