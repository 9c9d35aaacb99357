use webauthn_rs::prelude::*;
use webauthn_rs::{Webauthn, WebauthnBuilder};

use crate::bootstrap::config::Config;

/// Builds the WebAuthn verifier for the configured relying party. The
/// origin must be the exact scheme://host[:port] the browser sees.
pub fn build_webauthn(cfg: &Config) -> anyhow::Result<Webauthn> {
    let origin = Url::parse(&cfg.rp_origin)
        .map_err(|e| anyhow::anyhow!("invalid RP_ORIGIN {:?}: {e}", cfg.rp_origin))?;
    let webauthn = WebauthnBuilder::new(&cfg.rp_id, &origin)?
        .rp_name("Momento")
        .build()?;
    Ok(webauthn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_for_the_dev_defaults() {
        let mut cfg = Config::for_tests();
        cfg.rp_id = "localhost".into();
        cfg.rp_origin = "http://localhost:3000".into();
        assert!(build_webauthn(&cfg).is_ok());
    }

    #[test]
    fn rejects_a_malformed_origin() {
        let mut cfg = Config::for_tests();
        cfg.rp_origin = "not a url".into();
        assert!(build_webauthn(&cfg).is_err());
    }
}
