pub mod stripe_signature;
