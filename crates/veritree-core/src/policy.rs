//! Trust policies: which log and witness keys to accept, and how many
//! witness cosignatures a tree head needs.
//!
//! A policy is explicit caller-provided configuration; nothing is read
//! from the environment. A line-oriented text form is accepted for
//! interoperability with existing policy files:
//!
//! ```text
//! log <hex-key> [url]
//! witness <name> <hex-key>
//! quorum <k>|any|all
//! # comment
//! ```

use crate::errors::{CoreResult, Error};
use crate::keys::{KeyHash, VerificationKey};

#[derive(Debug, Clone)]
pub struct TrustPolicy {
    /// Keys the log may sign tree heads with. Any one match is accepted.
    pub log_keys: Vec<VerificationKey>,
    /// Witnesses whose cosignatures count towards the quorum.
    pub witnesses: Vec<VerificationKey>,
    /// Minimum count of distinct trusted witnesses that must cosign.
    pub quorum: usize,
    /// Base URL of the log's write endpoint, if the policy names one.
    pub log_url: Option<String>,
}

enum QuorumSpec {
    Count(usize),
    Any,
    All,
}

impl TrustPolicy {
    pub fn new(
        log_keys: Vec<VerificationKey>,
        witnesses: Vec<VerificationKey>,
        quorum: usize,
    ) -> Self {
        Self {
            log_keys,
            witnesses,
            quorum,
            log_url: None,
        }
    }

    /// Parse the line-oriented policy text format.
    ///
    /// `quorum` accepts an integer, `any` (one witness suffices), or `all`
    /// (every listed witness must cosign). A quorum directive is required
    /// whenever witnesses are listed. The parsed policy is validated
    /// before being returned.
    pub fn parse(text: &str) -> CoreResult<Self> {
        let mut log_keys = Vec::new();
        let mut witnesses = Vec::new();
        let mut log_url = None;
        let mut quorum_spec = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let directive = parts.next();
            match directive {
                Some("log") => {
                    let key = parts
                        .next()
                        .ok_or_else(|| Error::parse_policy(line_no, "log requires a key"))?;
                    let key = VerificationKey::from_hex(key)
                        .map_err(|e| Error::parse_policy(line_no, e.to_string()))?;
                    log_keys.push(key);
                    if let Some(url) = parts.next() {
                        log_url = Some(url.to_string());
                    }
                }
                Some("witness") => {
                    // The name is informational only; trust binds to the key.
                    let _name = parts
                        .next()
                        .ok_or_else(|| Error::parse_policy(line_no, "witness requires a name"))?;
                    let key = parts
                        .next()
                        .ok_or_else(|| Error::parse_policy(line_no, "witness requires a key"))?;
                    let key = VerificationKey::from_hex(key)
                        .map_err(|e| Error::parse_policy(line_no, e.to_string()))?;
                    witnesses.push(key);
                }
                Some("quorum") => {
                    let value = parts
                        .next()
                        .ok_or_else(|| Error::parse_policy(line_no, "quorum requires a value"))?;
                    quorum_spec = Some(match value {
                        "any" => QuorumSpec::Any,
                        "all" => QuorumSpec::All,
                        n => QuorumSpec::Count(n.parse().map_err(|_| {
                            Error::parse_policy(
                                line_no,
                                format!("quorum must be an integer, any, or all: {n}"),
                            )
                        })?),
                    });
                }
                Some(other) => {
                    return Err(Error::parse_policy(
                        line_no,
                        format!("unknown directive: {other}"),
                    ));
                }
                None => {}
            }
        }

        let quorum = match quorum_spec {
            Some(QuorumSpec::Count(k)) => k,
            Some(QuorumSpec::Any) => 1,
            Some(QuorumSpec::All) => witnesses.len(),
            None if witnesses.is_empty() => 0,
            None => {
                return Err(Error::invalid_policy(
                    "policy lists witnesses but no quorum directive",
                ));
            }
        };

        let policy = Self {
            log_keys,
            witnesses,
            quorum,
            log_url,
        };
        policy.validate()?;
        Ok(policy)
    }

    /// Structural checks: at least one log key; quorum between 1 and the
    /// witness count when witnesses are configured, exactly 0 otherwise.
    pub fn validate(&self) -> CoreResult<()> {
        if self.log_keys.is_empty() {
            return Err(Error::invalid_policy("at least one log key is required"));
        }
        if self.witnesses.is_empty() {
            if self.quorum != 0 {
                return Err(Error::invalid_policy(
                    "quorum requires witnesses to be configured",
                ));
            }
            return Ok(());
        }
        if self.quorum == 0 {
            return Err(Error::invalid_policy(
                "quorum must be at least 1 when witnesses are configured",
            ));
        }
        if self.quorum > self.witnesses.len() {
            return Err(Error::invalid_policy(format!(
                "quorum {} exceeds witness count {}",
                self.quorum,
                self.witnesses.len()
            )));
        }
        Ok(())
    }

    /// Look up a trusted witness key by its hash.
    pub fn witness_for(&self, hash: &KeyHash) -> Option<&VerificationKey> {
        self.witnesses.iter().find(|w| &w.key_hash() == hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Keypair;
    use assert_matches::assert_matches;

    fn key(seed: u8) -> VerificationKey {
        Keypair::from_seed(&[seed; 32]).public()
    }

    fn policy_text() -> String {
        format!(
            "# test policy\n\
             log {} https://log.example.org/v1/\n\
             \n\
             witness w1 {}\n\
             witness w2 {}\n\
             quorum 1\n",
            key(1).to_hex(),
            key(2).to_hex(),
            key(3).to_hex(),
        )
    }

    #[test]
    fn parse_full_policy() {
        let policy = TrustPolicy::parse(&policy_text()).unwrap();
        assert_eq!(policy.log_keys, vec![key(1)]);
        assert_eq!(policy.witnesses, vec![key(2), key(3)]);
        assert_eq!(policy.quorum, 1);
        assert_eq!(policy.log_url.as_deref(), Some("https://log.example.org/v1/"));
    }

    #[test]
    fn quorum_any_and_all() {
        let any = policy_text().replace("quorum 1", "quorum any");
        assert_eq!(TrustPolicy::parse(&any).unwrap().quorum, 1);

        let all = policy_text().replace("quorum 1", "quorum all");
        assert_eq!(TrustPolicy::parse(&all).unwrap().quorum, 2);
    }

    #[test]
    fn witnesses_without_quorum_rejected() {
        let text = policy_text().replace("quorum 1\n", "");
        assert_matches!(TrustPolicy::parse(&text), Err(Error::InvalidPolicy(_)));
    }

    #[test]
    fn unknown_directive_rejected() {
        let text = format!("group demo any w1 w2\n{}", policy_text());
        assert_matches!(
            TrustPolicy::parse(&text),
            Err(Error::ParsePolicy { line: 1, .. })
        );
    }

    #[test]
    fn bad_key_hex_rejected() {
        let text = "log nothex\n";
        assert_matches!(
            TrustPolicy::parse(text),
            Err(Error::ParsePolicy { line: 1, .. })
        );
    }

    #[test]
    fn validate_bounds_quorum() {
        let mut policy = TrustPolicy::new(vec![key(1)], vec![key(2), key(3)], 2);
        policy.validate().unwrap();

        policy.quorum = 3;
        assert_matches!(policy.validate(), Err(Error::InvalidPolicy(_)));

        policy.quorum = 0;
        assert_matches!(policy.validate(), Err(Error::InvalidPolicy(_)));
    }

    #[test]
    fn validate_requires_log_key() {
        let policy = TrustPolicy::new(vec![], vec![], 0);
        assert_matches!(policy.validate(), Err(Error::InvalidPolicy(_)));
    }

    #[test]
    fn witness_lookup_by_hash() {
        let policy = TrustPolicy::parse(&policy_text()).unwrap();
        assert_eq!(policy.witness_for(&key(2).key_hash()), Some(&key(2)));
        assert_eq!(policy.witness_for(&key(9).key_hash()), None);
    }
}
