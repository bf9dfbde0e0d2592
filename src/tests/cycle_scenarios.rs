// End-to-end cycles against mock authorization and data servers:
//  - empty cache: refresh, submit, done in one attempt
//  - stale cached token: 401, forced refresh, second attempt succeeds
//  - fresh token rejected: cycle fails, no third attempt

#[cfg(test)]
mod test {
    use httpmock::MockServer;

    use crate::cache::credential_cache::CredentialCache;
    use crate::config::settings::CollectConfig;
    use crate::errors::AgentError;
    use crate::helpers::time::now_i64;
    use crate::pipeline::context::{CycleOptions, RequestContext};
    use crate::pipeline::cycle::{AttemptResult, Cycle, CycleOutcome};
    use crate::pipeline::driver::Driver;
    use crate::sensor::generator::SensorGenerator;
    use crate::tests::common::*;

    fn cycle(auth: &MockServer, api: &MockServer, cache: &CredentialCache) -> Cycle {
        Cycle::new(provider(auth, cache), coordinator(api))
    }

    #[tokio::test]
    async fn empty_cache_cycle_submits_on_first_attempt() {
        let auth = MockServer::start();
        let api = MockServer::start();
        let token = token_mock(&auth, "tok-A", 3600);
        let data = data_mock(&api, "tok-A", 201, created_record());
        let cache = CredentialCache::new();

        let report = cycle(&auth, &api, &cache).run(reading()).await.unwrap();

        token.assert_calls(1);
        data.assert_calls(1);
        assert_eq!(report.outcome, CycleOutcome::Submitted { record: created_record(), attempts: 1 });
        assert!(report.context.options.ignore_token_request);
        assert!(report.context.options.ignore_submission);

        let cached = cache.peek().await.unwrap();
        assert_eq!(cached.access_token, "tok-A");
        assert!((cached.expires_at_unix_ts - (now_i64() + 3600)).abs() <= 2);
    }

    #[tokio::test]
    async fn stale_cached_token_is_retried_once_with_fresh_token() {
        let auth = MockServer::start();
        let api = MockServer::start();
        let token = token_mock(&auth, "tok-C", 3600);
        let rejected = data_mock(&api, "tok-B", 401, json!({"error": "revoked"}));
        let accepted = data_mock(&api, "tok-C", 201, created_record());
        let cache = CredentialCache::new();
        seed_cache(&cache, "tok-B", 3000).await;
        let cycle = cycle(&auth, &api, &cache);

        // first attempt: cache hit, no token call, remote rejects
        let (ctx, result) = cycle.attempt(RequestContext::new(reading())).await.unwrap();
        assert_eq!(result, AttemptResult::RetryWithFreshToken);
        assert!(ctx.options.force_new_token);
        assert_eq!(token.calls(), 0);

        // second attempt: forced refresh despite the still-unexpired tok-B
        let (ctx, result) = cycle.attempt(ctx).await.unwrap();
        assert_eq!(result, AttemptResult::Accepted(created_record()));
        assert!(!ctx.options.force_new_token);

        token.assert_calls(1);
        rejected.assert_calls(1);
        accepted.assert_calls(1);
        assert_eq!(cache.peek().await.unwrap().access_token, "tok-C");
    }

    #[tokio::test]
    async fn state_machine_reports_two_attempts_after_retry() {
        let auth = MockServer::start();
        let api = MockServer::start();
        token_mock(&auth, "tok-C", 3600);
        data_mock(&api, "tok-B", 401, json!({}));
        data_mock(&api, "tok-C", 201, created_record());
        let cache = CredentialCache::new();
        seed_cache(&cache, "tok-B", 3000).await;

        let report = cycle(&auth, &api, &cache).run(reading()).await.unwrap();

        assert_eq!(report.outcome, CycleOutcome::Submitted { record: created_record(), attempts: 2 });
        assert!(report.context.options.ignore_submission);
    }

    #[tokio::test]
    async fn fresh_token_rejected_on_retry_fails_without_third_attempt() {
        let auth = MockServer::start();
        let api = MockServer::start();
        let token = token_mock(&auth, "tok-C", 3600);
        data_mock(&api, "tok-B", 401, json!({}));
        let second = data_mock(&api, "tok-C", 401, json!({"error": "clock skew"}));
        let cache = CredentialCache::new();
        seed_cache(&cache, "tok-B", 3000).await;

        let err = cycle(&auth, &api, &cache).run(reading()).await.unwrap_err();

        assert!(matches!(err, AgentError::Submission { status: 401, .. }), "got {err:?}");
        token.assert_calls(1);
        second.assert_calls(1);
    }

    #[tokio::test]
    async fn next_cycle_reuses_token_minted_by_previous_one() {
        let auth = MockServer::start();
        let api = MockServer::start();
        let token = token_mock(&auth, "tok-A", 3600);
        let data = data_mock(&api, "tok-A", 201, created_record());
        let cache = CredentialCache::new();
        let cycle = cycle(&auth, &api, &cache);

        cycle.run(reading()).await.unwrap();
        let report = cycle.run(reading()).await.unwrap();

        assert!(matches!(report.outcome, CycleOutcome::Submitted { attempts: 1, .. }));
        token.assert_calls(1);
        data.assert_calls(2);
    }

    #[tokio::test]
    async fn failed_cycle_is_discarded_and_next_cycle_refreshes() {
        let auth = MockServer::start();
        let api = MockServer::start();
        let mut failing = auth.mock(|when, then| {
            when.method(httpmock::Method::POST).path(TOKEN_PATH);
            then.status(503).body("maintenance");
        });
        let cache = CredentialCache::new();
        let generator = SensorGenerator::new("iot-device-12");
        let collect = CollectConfig { interval_seconds: 60, disabled: true };
        let driver = Driver::new(cycle(&auth, &api, &cache), generator, collect);

        assert_eq!(driver.run_once().await, None);
        assert!(cache.peek().await.is_none());

        failing.delete();
        let token = token_mock(&auth, "tok-A", 3600);
        let data = api.mock(|when, then| {
            when.method(httpmock::Method::POST).path(DATA_PATH).header("authorization", "Bearer tok-A");
            then.status(201).json_body(json!({"id": 8}));
        });

        let outcome = driver.run_once().await;

        assert!(matches!(outcome, Some(CycleOutcome::Submitted { attempts: 1, .. })));
        token.assert_calls(1);
        data.assert_calls(1);
    }

    #[tokio::test]
    async fn skipped_authentication_ends_cycle_without_network() {
        let auth = MockServer::start();
        let api = MockServer::start();
        let token = token_mock(&auth, "tok-A", 3600);
        let data = data_mock(&api, "tok-A", 201, created_record());
        let cache = CredentialCache::new();
        let options = CycleOptions { ignore_token_request: true, ..Default::default() };

        let report = cycle(&auth, &api, &cache)
            .run_with(RequestContext::with_options(reading(), options))
            .await
            .unwrap();

        assert_eq!(report.outcome, CycleOutcome::Skipped);
        assert_eq!(token.calls(), 0);
        assert_eq!(data.calls(), 0);
    }

    #[tokio::test]
    async fn disabled_timer_runs_exactly_one_cycle() {
        let auth = MockServer::start();
        let api = MockServer::start();
        token_mock(&auth, "tok-A", 3600);
        let data = api.mock(|when, then| {
            when.method(httpmock::Method::POST).path(DATA_PATH);
            then.status(201).json_body(json!({"id": 1}));
        });
        let cache = CredentialCache::new();
        let collect = CollectConfig { interval_seconds: 1, disabled: true };
        let driver = Driver::new(cycle(&auth, &api, &cache), SensorGenerator::new("iot-device-12"), collect);

        // shutdown never fires; a disabled timer must return on its own
        driver.run(std::future::pending::<()>()).await.unwrap();

        data.assert_calls(1);
    }

    #[tokio::test]
    async fn timer_stops_on_shutdown() {
        let auth = MockServer::start();
        let api = MockServer::start();
        token_mock(&auth, "tok-A", 3600);
        let data = api.mock(|when, then| {
            when.method(httpmock::Method::POST).path(DATA_PATH);
            then.status(201).json_body(json!({"id": 1}));
        });
        let cache = CredentialCache::new();
        let collect = CollectConfig { interval_seconds: 3600, disabled: false };
        let driver = Driver::new(cycle(&auth, &api, &cache), SensorGenerator::new("iot-device-12"), collect);

        // first tick fires immediately, the next one is an hour away
        driver
            .run(tokio::time::sleep(std::time::Duration::from_millis(500)))
            .await
            .unwrap();

        data.assert_calls(1);
    }
}
