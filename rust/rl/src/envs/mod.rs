pub mod toy_chain;
