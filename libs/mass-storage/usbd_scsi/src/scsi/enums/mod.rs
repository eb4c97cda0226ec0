mod op_code;
pub use op_code::*;

mod additional_sense_code;
pub use additional_sense_code::*;

mod sense_key;
pub use sense_key::*;
