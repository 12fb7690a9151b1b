mod coefficients;
mod signal;

pub use coefficients::{
    MAX_POLE_RADIUS, random_stable_coefficients, random_stable_transfer_function,
};
pub use signal::{bit_stream, create_rng, gaussian_signal};
