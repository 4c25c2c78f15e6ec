use std::time::Duration;

/// Status codes that count as "reachable". 404 is a liveness signal here, not a failure.
pub const ACCEPTED_STATUSES: [u16; 3] = [200, 302, 404];

/// Outcome of the single GET issued per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    Status(u16),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Up(u16),
    AlertWorthy(String),
}

impl CheckResult {
    pub fn verdict(&self) -> Verdict {
        match self {
            CheckResult::Status(code) if ACCEPTED_STATUSES.contains(code) => Verdict::Up(*code),
            CheckResult::Status(code) => Verdict::AlertWorthy(format!("HTTP Status Code: {}", code)),
            CheckResult::Failed(detail) => Verdict::AlertWorthy(detail.clone()),
        }
    }
}

/// HTTP client shared by the run; `timeout` bounds the whole request.
pub fn build_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Issues one GET against `url`. Every transport problem (refused connection,
/// timeout, DNS, TLS, malformed URL) is folded into `CheckResult::Failed`.
pub async fn check(client: &reqwest::Client, url: &str) -> CheckResult {
    match client.get(url).send().await {
        Ok(response) => {
            let code = response.status().as_u16();
            log::info!("Received response code: {}", code);
            CheckResult::Status(code)
        }
        Err(e) => {
            log::error!("Exception occurred: {}", e);
            CheckResult::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_statuses_are_up() {
        for code in ACCEPTED_STATUSES {
            assert_eq!(CheckResult::Status(code).verdict(), Verdict::Up(code));
        }
    }

    #[test]
    fn test_other_statuses_need_an_alert() {
        for code in [100, 201, 204, 301, 304, 400, 401, 403, 500, 502, 503] {
            assert_eq!(
                CheckResult::Status(code).verdict(),
                Verdict::AlertWorthy(format!("HTTP Status Code: {}", code))
            );
        }
    }

    #[test]
    fn test_failure_detail_is_passed_through() {
        let result = CheckResult::Failed("operation timed out".into());
        assert_eq!(
            result.verdict(),
            Verdict::AlertWorthy("operation timed out".into())
        );
    }

    #[tokio::test]
    async fn test_malformed_url_is_a_failure() {
        let client = build_client(Duration::from_secs(1)).unwrap();
        match check(&client, "not a url").await {
            CheckResult::Failed(detail) => assert!(!detail.is_empty()),
            other => panic!("expected a failure, got {:?}", other),
        }
    }
}
