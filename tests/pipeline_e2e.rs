// End-to-end runs against a mock search endpoint

#[cfg(test)]
mod tests {
    use release_board::config::{Config, Credentials};
    use release_board::jira::rest::JiraRest;
    use release_board::pipeline::{run, RunOptions, RunOutcome};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SEARCH: &str = "/rest/api/3/search/jql";
    // base64("ops@example.com:tok")
    const AUTH: &str = "Basic b3BzQGV4YW1wbGUuY29tOnRvaw==";

    const TEMPLATE: &str = "<html><body>\n<table><tbody>\n<!--CI_TBODY-->\n<!--/CI_TBODY-->\n</tbody></table>\n</body></html>\n";

    fn credentials() -> Credentials {
        Credentials {
            email: "ops@example.com".to_string(),
            api_token: "tok".to_string(),
        }
    }

    fn config(base_url: &str, extra_jira: &str, jql: &str) -> Config {
        Config::parse(&format!(
            r#"
            [jira]
            base_url = "{}"
            {}

            [render]
            profile = "specialized"
            release_type_label = "Differential"
            [render.release_dates]
            "10.11.003" = "06th March"

            [[products]]
            key = "CI"
            name = "Continuous Integration"
            tbody_marker = "CI_TBODY"
            jql = '{}'
            "#,
            base_url, extra_jira, jql
        ))
        .unwrap()
    }

    fn template(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("index.html");
        std::fs::write(&path, content).unwrap();
        path
    }

    async fn mock_search(server: &MockServer, status: u16, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(SEARCH))
            .and(header("authorization", AUTH))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_zero_issues_renders_placeholder_row() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SEARCH))
            .and(query_param("jql", "project=CI"))
            .and(query_param("maxResults", "100"))
            .and(header("authorization", AUTH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"issues": []})))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = config(&server.uri(), "", "project=CI");
        let client = JiraRest::new(&cfg.jira, &credentials()).unwrap();
        let dir = TempDir::new().unwrap();
        let file = template(&dir, TEMPLATE);

        let outcome = run(&cfg, &client, &file, RunOptions::default()).await.unwrap();
        assert_eq!(outcome, RunOutcome::Updated);

        let written = std::fs::read_to_string(&file).unwrap();
        assert_eq!(
            written,
            "<html><body>\n<table><tbody>\n<!--CI_TBODY-->\n<tr><td colspan=\"4\">No matching issues.</td></tr>\n<!--/CI_TBODY-->\n</tbody></table>\n</body></html>\n"
        );
    }

    #[tokio::test]
    async fn test_specialized_row_end_to_end() {
        let server = MockServer::start().await;
        mock_search(
            &server,
            200,
            serde_json::json!({
                "issues": [{
                    "id": "10001",
                    "key": "CI-42",
                    "fields": {
                        "issuetype": {"name": "Task"},
                        "status": {"name": "Closed", "statusCategory": {"key": "done", "name": "Done"}},
                        "fixVersions": [{"id": "200", "name": "10.11.003"}]
                    }
                }]
            }),
        )
        .await;

        let cfg = config(&server.uri(), "", "project=CI");
        let client = JiraRest::new(&cfg.jira, &credentials()).unwrap();
        let dir = TempDir::new().unwrap();
        let file = template(&dir, TEMPLATE);

        run(&cfg, &client, &file, RunOptions::default()).await.unwrap();

        let written = std::fs::read_to_string(&file).unwrap();
        assert!(written.contains(
            "<!--CI_TBODY-->\n<tr><td>10.11.003</td><td>Differential</td>\
             <td><span class=\"status released\">Released</span></td>\
             <td>06th March</td></tr>\n<!--/CI_TBODY-->"
        ));
    }

    #[tokio::test]
    async fn test_remote_error_is_fatal_and_leaves_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SEARCH))
            .respond_with(ResponseTemplate::new(400).set_body_string("The value 'NOPE' does not exist"))
            .mount(&server)
            .await;

        let cfg = config(&server.uri(), "", "project=NOPE");
        let client = JiraRest::new(&cfg.jira, &credentials()).unwrap();
        let dir = TempDir::new().unwrap();
        let file = template(&dir, TEMPLATE);

        let err = run(&cfg, &client, &file, RunOptions::default()).await.unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("CI"), "{}", msg);
        assert!(msg.contains("400"), "{}", msg);
        assert!(msg.contains("does not exist"), "{}", msg);
        assert_eq!(std::fs::read_to_string(&file).unwrap(), TEMPLATE);
    }

    #[tokio::test]
    async fn test_missing_marker_is_fatal_and_leaves_file() {
        let server = MockServer::start().await;
        mock_search(&server, 200, serde_json::json!({"issues": []})).await;

        let cfg = config(&server.uri(), "", "project=CI");
        let client = JiraRest::new(&cfg.jira, &credentials()).unwrap();
        let dir = TempDir::new().unwrap();
        let original = "<html><!--OTHER--><!--/OTHER--></html>";
        let file = template(&dir, original);

        let err = run(&cfg, &client, &file, RunOptions::default()).await.unwrap_err();
        assert!(format!("{:#}", err).contains("CI_TBODY"));
        assert_eq!(std::fs::read_to_string(&file).unwrap(), original);
    }

    #[tokio::test]
    async fn test_second_run_reports_no_change() {
        let server = MockServer::start().await;
        mock_search(&server, 200, serde_json::json!({"issues": []})).await;

        let cfg = config(&server.uri(), "", "project=CI");
        let client = JiraRest::new(&cfg.jira, &credentials()).unwrap();
        let dir = TempDir::new().unwrap();
        let file = template(&dir, TEMPLATE);

        let first = run(&cfg, &client, &file, RunOptions::default()).await.unwrap();
        let after_first = std::fs::read_to_string(&file).unwrap();
        let second = run(&cfg, &client, &file, RunOptions::default()).await.unwrap();

        assert_eq!(first, RunOutcome::Updated);
        assert_eq!(second, RunOutcome::Unchanged);
        assert_eq!(std::fs::read_to_string(&file).unwrap(), after_first);
    }

    #[tokio::test]
    async fn test_dry_run_does_not_write() {
        let server = MockServer::start().await;
        mock_search(&server, 200, serde_json::json!({"issues": []})).await;

        let cfg = config(&server.uri(), "", "project=CI");
        let client = JiraRest::new(&cfg.jira, &credentials()).unwrap();
        let dir = TempDir::new().unwrap();
        let file = template(&dir, TEMPLATE);

        let options = RunOptions {
            dry_run: true,
            ..RunOptions::default()
        };
        let outcome = run(&cfg, &client, &file, options).await.unwrap();
        assert_eq!(outcome, RunOutcome::WouldUpdate);
        assert_eq!(std::fs::read_to_string(&file).unwrap(), TEMPLATE);
    }

    #[tokio::test]
    async fn test_quoted_project_rewritten_before_send() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SEARCH))
            .and(query_param("jql", "project = CI ORDER BY created DESC"))
            .and(query_param("maxResults", "25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"issues": []})))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = config(
            &server.uri(),
            "max_results = 25\nrewrite_project_names = true",
            r#"project = "Continuous Integration" ORDER BY created DESC"#,
        );
        let client = JiraRest::new(&cfg.jira, &credentials()).unwrap();
        let dir = TempDir::new().unwrap();
        let file = template(&dir, TEMPLATE);

        run(&cfg, &client, &file, RunOptions::default()).await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_body_treated_as_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(SEARCH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let cfg = config(&server.uri(), "", "project=CI");
        let client = JiraRest::new(&cfg.jira, &credentials()).unwrap();
        let dir = TempDir::new().unwrap();
        let file = template(&dir, TEMPLATE);

        run(&cfg, &client, &file, RunOptions::default()).await.unwrap();
        assert!(std::fs::read_to_string(&file)
            .unwrap()
            .contains("No matching issues."));
    }
}
