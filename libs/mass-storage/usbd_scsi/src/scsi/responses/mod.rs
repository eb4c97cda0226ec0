//! Parameter data sent back to the host, encoded big endian at fixed offsets

mod inquiry;
pub use inquiry::*;

mod request_sense;
pub use request_sense::*;

mod read_capacity;
pub use read_capacity::*;

mod read_format_capacities;
pub use read_format_capacities::*;

mod mode_parameter;
pub use mode_parameter::*;
