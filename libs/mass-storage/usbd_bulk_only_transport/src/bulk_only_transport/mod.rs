// Vendored from https://github.com/stm32-rs/stm32-usbd tag v0.6.0
// Original copyright (c) 2021 Matti Virkkunen <mvirkkunen@gmail.com>, Vadim Kaushan <admin@disasm.info>,
// Nicolas Stalder <n@stalder.io>", Jonas Martin <lichtfeind@gmail.com>
// SPDX-License-Identifier: MIT
// SPDX-LIcense-Identifier: Apache 2.0

mod direction;
pub use direction::*;

mod command_status;
pub use command_status::*;

mod command_block_wrapper;
pub use command_block_wrapper::*;

mod command_status_wrapper;
pub use command_status_wrapper::*;

mod state;
pub use state::*;

mod endpoints;
pub use endpoints::*;

mod bulk_only_transport;
pub use bulk_only_transport::{
    BulkOnlyTransport,
    Error,
    Malformed,
};
