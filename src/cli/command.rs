use crate::listing::ListingParams;

pub enum Command {
    /// Run the HTTP server until shutdown.
    Serve,
    /// Generate demo accounts and listings.
    Seed {
        agents: usize,
        properties: usize,
    },
    /// Run the listing query against the store, optionally as a given account.
    Query {
        params: ListingParams,
        user: Option<String>,
    },
    /// Print the effective configuration.
    Config,
}
