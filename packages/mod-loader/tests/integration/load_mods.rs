use ::common::LoaderConfig;
use ::common::event::{EngineEvent, LOAD_MODS, LOAD_WIDGET};
use mod_loader::{FetchResponse, MemoryFetcher, ModStatus};

use crate::common::{Lifecycle, TestHost};

const MIXED: &str = r#"[
    {"name":"A","version":"1","type":"style","entry":"a/a.css"},
    {"name":"B","version":"1","type":"bogus","entry":"b"},
    {"name":"C","version":"1","type":"script","entry":"c/c.js","readyEvent":"c-ready"}
]"#;

fn mixed_fetcher() -> MemoryFetcher {
    MemoryFetcher::new()
        .with_text("coui://a/a.css", "body { color: red; }")
        .with_text("coui://c/c.js", "fire:c-ready")
}

mod ordering {
    use super::*;

    #[tokio::test]
    async fn style_unknown_and_script_load_in_order() {
        let mut host = TestHost::new(mixed_fetcher());

        let report = host.loader.load_mods(MIXED).await.unwrap();

        assert_eq!(
            host.lifecycle(),
            vec![
                Lifecycle::Start(0),
                Lifecycle::Complete(0, true),
                Lifecycle::Start(2),
                Lifecycle::Complete(2, true),
            ]
        );
        assert_eq!(
            host.fetcher.requests(),
            vec!["coui://a/a.css".to_string(), "coui://c/c.js".to_string()]
        );
        assert_eq!(
            host.ui.document.inner_html("style-mods").unwrap(),
            "<style>body { color: red; }</style>"
        );
        assert_eq!(report.loaded(), 2);
        assert_eq!(report.skipped(), 1);
        assert!(matches!(report.entries[1].status, ModStatus::Skipped(_)));
    }

    #[tokio::test]
    async fn next_mod_waits_for_the_ready_event() {
        let fetcher = MemoryFetcher::new()
            .with_text("coui://slow/main.js", "init()")
            .with_text("coui://fast/main.js", "init()");
        let mut host = TestHost::new(fetcher);
        let manifests = r#"[
            {"name":"Slow","version":1,"type":"script","entry":"slow/main.js","readyEvent":"slow-ready"},
            {"name":"Fast","version":1,"type":"total-conversion","entry":"fast/main.js"}
        ]"#;

        let pass = host.loader.spawn_load_mods(manifests.to_string());
        host.wait_for_scripts(1).await;

        assert_eq!(host.lifecycle(), vec![Lifecycle::Start(0)]);
        assert_eq!(host.fetcher.requests(), vec!["coui://slow/main.js".to_string()]);

        host.bus.trigger(&EngineEvent::new("unrelated"));
        tokio::task::yield_now().await;
        assert!(host.lifecycle().is_empty());

        host.bus.trigger(&EngineEvent::new("slow-ready"));
        let report = pass.await.unwrap().unwrap();

        assert_eq!(
            host.lifecycle(),
            vec![
                Lifecycle::Complete(0, true),
                Lifecycle::Start(1),
                Lifecycle::Complete(1, true),
            ]
        );
        assert_eq!(report.loaded(), 2);
    }

    #[tokio::test]
    async fn repeated_ready_event_completes_once() {
        let fetcher = MemoryFetcher::new().with_text("coui://w/w.html", "<div>kills</div>");
        let mut host = TestHost::new(fetcher);
        let manifests = r#"[{"name":"W","version":"1","type":"widget","entry":"w/w.html","readyEvent":"w-ready"}]"#;

        let pass = host.loader.spawn_load_mods(manifests.to_string());
        while !host.drain().iter().any(|e| e.is(LOAD_WIDGET)) {
            tokio::task::yield_now().await;
        }

        host.bus.trigger(&EngineEvent::new("w-ready"));
        host.bus.trigger(&EngineEvent::new("w-ready"));
        pass.await.unwrap();

        assert_eq!(host.lifecycle(), vec![Lifecycle::Complete(0, true)]);
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn failed_fetch_does_not_stop_later_mods() {
        let fetcher = MemoryFetcher::new()
            .with_response("coui://a/a.css", FetchResponse::status_only(500, "Internal Server Error"))
            .with_transport_error("coui://t/t.js", "connection refused")
            .with_text("coui://c/c.js", "init()");
        let mut host = TestHost::new(fetcher);
        let manifests = r#"[
            {"name":"A","version":"1","type":"style","entry":"a/a.css"},
            {"name":"T","version":"1","type":"theme","entry":"t/t.js"},
            {"name":"M","version":"1","type":"widget","entry":"missing/index.html"},
            {"name":"C","version":"1","type":"script","entry":"c/c.js"}
        ]"#;

        let report = host.loader.load_mods(manifests).await.unwrap();

        assert_eq!(
            host.lifecycle(),
            vec![
                Lifecycle::Start(0),
                Lifecycle::Complete(0, false),
                Lifecycle::Start(1),
                Lifecycle::Complete(1, false),
                Lifecycle::Start(2),
                Lifecycle::Complete(2, false),
                Lifecycle::Start(3),
                Lifecycle::Complete(3, true),
            ]
        );
        assert_eq!(report.failed(), 3);
        assert_eq!(report.loaded(), 1);
    }

    #[tokio::test]
    async fn broken_scripts_are_isolated() {
        let fetcher = MemoryFetcher::new()
            .with_text("coui://p/p.js", "panic")
            .with_text("coui://s/s.js", "throw")
            .with_text("coui://ok/ok.js", "init()");
        let mut host = TestHost::new(fetcher);
        let manifests = r#"[
            {"name":"P","version":"1","type":"script","entry":"p/p.js","readyEvent":"p-ready"},
            {"name":"S","version":"1","type":"script","entry":"s/s.js"},
            {"name":"OK","version":"1","type":"script","entry":"ok/ok.js"}
        ]"#;

        host.loader.load_mods(manifests).await.unwrap();

        assert_eq!(
            host.lifecycle(),
            vec![
                Lifecycle::Start(0),
                Lifecycle::Complete(0, false),
                Lifecycle::Start(1),
                Lifecycle::Complete(1, false),
                Lifecycle::Start(2),
                Lifecycle::Complete(2, true),
            ]
        );
        assert_eq!(host.ui.document.scripts().len(), 1);
    }

    #[tokio::test]
    async fn malformed_envelope_emits_nothing() {
        let mut host = TestHost::new(mixed_fetcher());

        assert!(host.loader.load_mods("{not json").await.is_none());

        assert!(host.drain().is_empty());
        assert!(host.fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn mistyped_manifest_fields_stay_local_to_their_mod() {
        let odd_manifests = [
            r#"{"name":"B","version":"1","type":3,"entry":"b/b.css"}"#,
            r#"{"name":null,"version":"1","type":"style","entry":"b/b.css"}"#,
            r#"{"name":"B","version":null,"type":"style","entry":"b/b.css"}"#,
            r#"{"name":"B","version":"1","type":"style","entry":"b/b.css","author":"Jane Doe"}"#,
        ];

        for odd in odd_manifests {
            let fetcher = MemoryFetcher::new().with_text("coui://a/a.css", "body {}");
            let mut host = TestHost::new(fetcher);
            let manifests = format!(
                r#"[{{"name":"A","version":"1","type":"style","entry":"a/a.css"}},{odd}]"#
            );

            let report = host.loader.load_mods(&manifests).await.unwrap();

            assert_eq!(report.entries[0].status, ModStatus::Loaded, "for {odd}");
            assert_eq!(report.len(), 2, "for {odd}");
            assert_eq!(
                host.lifecycle()[..2],
                [Lifecycle::Start(0), Lifecycle::Complete(0, true)],
                "for {odd}"
            );
            assert_eq!(host.fetcher.requests()[0], "coui://a/a.css", "for {odd}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_ready_event_times_out() {
        let fetcher = MemoryFetcher::new()
            .with_text("coui://stall/main.js", "init()")
            .with_text("coui://next/main.js", "init()");
        let config = LoaderConfig {
            ready_timeout_secs: 5,
            ..Default::default()
        };
        let mut host = TestHost::with_config(fetcher, config);
        let manifests = r#"[
            {"name":"Stall","version":"1","type":"script","entry":"stall/main.js","readyEvent":"never"},
            {"name":"Next","version":"1","type":"script","entry":"next/main.js"}
        ]"#;

        host.loader.load_mods(manifests).await.unwrap();

        assert_eq!(
            host.lifecycle(),
            vec![
                Lifecycle::Start(0),
                Lifecycle::Complete(0, false),
                Lifecycle::Start(1),
                Lifecycle::Complete(1, true),
            ]
        );
    }

    #[tokio::test]
    async fn shutdown_releases_a_stalled_mod() {
        let fetcher = MemoryFetcher::new().with_text("coui://stall/main.js", "init()");
        let config = LoaderConfig {
            ready_timeout_secs: 0,
            ..Default::default()
        };
        let mut host = TestHost::with_config(fetcher, config);
        let manifests = r#"[{"name":"Stall","version":"1","type":"script","entry":"stall/main.js","readyEvent":"never"}]"#;

        let pass = host.loader.spawn_load_mods(manifests.to_string());
        host.wait_for_scripts(1).await;
        host.loader.session().shutdown();
        let report = pass.await.unwrap().unwrap();

        assert_eq!(report.failed(), 1);
        assert_eq!(
            host.lifecycle(),
            vec![Lifecycle::Start(0), Lifecycle::Complete(0, false)]
        );
    }
}

mod session {
    use super::*;

    #[tokio::test]
    async fn second_pass_is_a_no_op() {
        let mut host = TestHost::new(mixed_fetcher());

        assert!(host.loader.load_mods(MIXED).await.is_some());
        let first_events = host.lifecycle();
        let first_requests = host.fetcher.requests();

        assert!(host.loader.load_mods(MIXED).await.is_none());
        assert!(host.drain().is_empty());
        assert_eq!(host.fetcher.requests(), first_requests);
        assert_eq!(first_events.len(), 4);
    }

    #[tokio::test]
    async fn malformed_envelope_still_consumes_the_session() {
        let mut host = TestHost::new(mixed_fetcher());

        assert!(host.loader.load_mods("null").await.is_none());
        assert!(host.loader.load_mods(MIXED).await.is_none());
        assert!(host.drain().is_empty());
    }

    #[tokio::test]
    async fn unknown_types_can_be_reported_as_failures() {
        let config = LoaderConfig {
            report_unknown_as_failed: true,
            ..Default::default()
        };
        let mut host = TestHost::with_config(mixed_fetcher(), config);

        host.loader.load_mods(MIXED).await.unwrap();

        assert_eq!(
            host.lifecycle(),
            vec![
                Lifecycle::Start(0),
                Lifecycle::Complete(0, true),
                Lifecycle::Start(1),
                Lifecycle::Complete(1, false),
                Lifecycle::Start(2),
                Lifecycle::Complete(2, true),
            ]
        );
        assert_eq!(host.fetcher.requests().len(), 2);
    }

    #[tokio::test]
    async fn listener_runs_a_single_pass_for_repeated_triggers() {
        let mut host = TestHost::new(mixed_fetcher());
        let listener = host.loader.listen();

        let load = EngineEvent::new(LOAD_MODS).arg(MIXED);
        host.bus.trigger(&load);
        host.bus.trigger(&load);

        while host.fetcher.requests().len() < 2 || host.ui.document.scripts().is_empty() {
            tokio::task::yield_now().await;
        }
        let mut lifecycle = Vec::new();
        while lifecycle.len() < 4 {
            lifecycle.extend(host.lifecycle());
            tokio::task::yield_now().await;
        }
        host.loader.session().shutdown();
        listener.await.unwrap();

        assert_eq!(
            lifecycle,
            vec![
                Lifecycle::Start(0),
                Lifecycle::Complete(0, true),
                Lifecycle::Start(2),
                Lifecycle::Complete(2, true),
            ]
        );
        assert_eq!(host.fetcher.requests().len(), 2);
    }
}
