pub enum Auth {
    /// Exchange API3 client credentials for an access token via `/login`
    ClientCredentials(String, String),
    /// Use a pre-issued access token
    Token(String),
    /// Don't use any authentication
    None,
}

impl Auth {
    /// Pick an auth method from optional settings.
    ///
    /// A token wins over credentials; credentials need both id and secret.
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        token: Option<String>,
    ) -> Self {
        match (client_id, client_secret, token) {
            (_, _, Some(token)) => Self::Token(token),
            (Some(id), Some(secret), None) => Self::ClientCredentials(id, secret),
            _ => Self::None,
        }
    }
}

impl std::fmt::Display for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClientCredentials(_, _) => write!(f, "ClientCredentials"),
            Self::Token(_) => write!(f, "Token"),
            Self::None => write!(f, "None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_selection() {
        let auth = Auth::new(Some("id".to_string()), Some("secret".to_string()), None);
        assert_eq!(auth.to_string(), "ClientCredentials");

        // Secret missing
        let auth = Auth::new(Some("id".to_string()), None, None);
        assert_eq!(auth.to_string(), "None");

        let auth = Auth::new(
            Some("id".to_string()),
            Some("secret".to_string()),
            Some("abc".to_string()),
        );
        assert_eq!(auth.to_string(), "Token");
    }
}
