//! Path templates for the remote operations.

/// One remote resource path, with its path parameters filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    Customers,
    Customer(&'a str),
    Tokens,
    Sources(&'a str),
    Source { customer: &'a str, card: &'a str },
    Charges,
    Refunds,
}

impl Endpoint<'_> {
    /// Path relative to the API version segment.
    pub fn path(&self) -> String {
        match self {
            Endpoint::Customers => "/customers".to_string(),
            Endpoint::Customer(id) => format!("/customers/{id}"),
            Endpoint::Tokens => "/tokens".to_string(),
            Endpoint::Sources(customer) => format!("/customers/{customer}/sources"),
            Endpoint::Source { customer, card } => {
                format!("/customers/{customer}/sources/{card}")
            }
            Endpoint::Charges => "/charges".to_string(),
            Endpoint::Refunds => "/refunds".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_path_parameters() {
        assert_eq!(Endpoint::Customers.path(), "/customers");
        assert_eq!(Endpoint::Customer("cus_1").path(), "/customers/cus_1");
        assert_eq!(Endpoint::Sources("cus_1").path(), "/customers/cus_1/sources");
        assert_eq!(
            Endpoint::Source {
                customer: "cus_1",
                card: "card_2"
            }
            .path(),
            "/customers/cus_1/sources/card_2"
        );
        assert_eq!(Endpoint::Refunds.path(), "/refunds");
    }
}
