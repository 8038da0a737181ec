// Role-gated authentication and profile resolution.
// Signup, sign-in, session resolution and the HireDeck gate all live here;
// persistence and the identity provider are reached only through their traits.

pub mod effects;
pub mod gate;
pub mod handlers;
pub mod resolver;
pub mod service;
pub mod session;
pub mod signup;
#[cfg(test)]
pub mod testing;
pub mod validation;
