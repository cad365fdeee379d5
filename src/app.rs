use std::{
    path::PathBuf,
    sync::{mpsc, Arc, Mutex},
    time::Duration,
};

use anyhow::Result;
use tokio::runtime::Runtime;

use crate::{
    cli::{Cli, Command},
    domain::{
        self,
        page::{parse_page_param, PageContext, ResourceMarker},
        presence::{PresenceBoard, UserBadge},
        shell_state::ShellState,
        tag_filter::{TagCard, TagFilterState},
    },
    infra::{
        self,
        stubs::{NoopNotificationFacade, NoopQuestionFeed, StaticFacadeProvider},
    },
    realtime::{
        self,
        binder::PresenceBinder,
        discovery::ConnectionDiscovery,
        library::{artifact_path, LibrarySource, LocalLibrarySource, RemoteLibrarySource},
        readiness::ReadinessGate,
        shared_slot::SharedConnectionSlot,
        simulated::{SimulatedConnection, SimulatedFeed},
    },
    ui::{
        self, ChannelConnectionStateSource, CompositeEventSource, CrosstermEventSource,
        DiscoveredPresenceSource,
    },
    usecases::{
        self, bootstrap, context::AppContext, membership::GroupMembership,
        shell::DefaultShellOrchestrator,
    },
};

const DISCOVERY_START_FAILED: &str = "APP_DISCOVERY_START_FAILED";

pub fn run(cli: Cli) -> Result<()> {
    let (context, _log_guard) = bootstrap::bootstrap(cli.config.as_deref())?;

    tracing::debug!(
        ui = ui::module_name(),
        domain = domain::module_name(),
        realtime = realtime::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    match cli.command_or_default() {
        Command::Run {
            question,
            page_params,
            filter,
        } => {
            let page = build_page_context(question, &page_params)?;
            run_dashboard(&context, page, filter.unwrap_or_default())
        }
    }
}

fn run_dashboard(context: &AppContext, page: PageContext, initial_filter: String) -> Result<()> {
    let artifact = artifact_path(&context.layout.cache_dir);
    let primary: Arc<dyn LibrarySource> = Arc::new(RemoteLibrarySource::new(
        context.config.library.primary_url.clone(),
        artifact.clone(),
    ));
    let fallback: Arc<dyn LibrarySource> = Arc::new(LocalLibrarySource::new(
        PathBuf::from(&context.config.library.fallback_path),
        artifact.clone(),
    ));
    // The simulated client is compiled in, so the realtime library counts
    // as already present in this composition. The remote and local tiers
    // stay wired as the acquisition path for real client artifacts.
    let gate = ReadinessGate::with_library_present(primary, fallback);

    // The simulated integration owns the connection and publishes it into
    // the shared slot; everything below only consumes the slot.
    let slot = SharedConnectionSlot::new();
    let runtime = Runtime::new()?;
    let (status_tx, status_rx) = mpsc::channel();
    let connection = Arc::new(SimulatedConnection::new(1));
    let _feed = SimulatedFeed::start(
        &runtime,
        connection,
        slot.clone(),
        status_tx,
        Duration::from_millis(context.config.feed.step_ms),
    )?;

    let (found_tx, found_rx) = mpsc::channel();
    let discovery_slot = slot.clone();
    let poll_interval = Duration::from_millis(context.config.discovery.poll_interval_ms);
    let max_attempts = Some(context.config.discovery.max_attempts);
    let discovery_holder: Arc<Mutex<Option<ConnectionDiscovery>>> = Arc::new(Mutex::new(None));
    let holder = discovery_holder.clone();
    gate.ready(move || {
        match ConnectionDiscovery::start(
            Arc::new(discovery_slot),
            poll_interval,
            max_attempts,
            found_tx,
        ) {
            Ok(discovery) => {
                if let Ok(mut active) = holder.lock() {
                    *active = Some(discovery);
                }
            }
            Err(error) => {
                tracing::warn!(
                    code = DISCOVERY_START_FAILED,
                    error = %error,
                    "connection discovery could not start"
                );
            }
        }
    });

    let facades = Arc::new(StaticFacadeProvider::new(
        Some(Arc::new(NoopNotificationFacade)),
        Some(Arc::new(NoopQuestionFeed)),
    ));
    let _membership = GroupMembership::activate(
        &page,
        facades,
        Duration::from_millis(context.config.membership.poll_interval_ms),
    );

    let state = ShellState::new(
        demo_presence_board(),
        TagFilterState::new(demo_tag_cards(), initial_filter),
    );
    let mut orchestrator = DefaultShellOrchestrator::new(state);
    let mut events = CompositeEventSource::new(vec![
        Box::new(DiscoveredPresenceSource::new(found_rx, PresenceBinder::new())),
        Box::new(ChannelConnectionStateSource::new(status_rx)),
        Box::new(CrosstermEventSource::default()),
    ]);

    ui::shell::start(context, &mut events, &mut orchestrator)
}

fn build_page_context(
    question: Option<Option<String>>,
    raw_params: &[String],
) -> Result<PageContext> {
    let mut params = Vec::with_capacity(raw_params.len());
    for raw in raw_params {
        params.push(parse_page_param(raw)?);
    }

    let marker = question.map(ResourceMarker::question);
    Ok(PageContext::new(marker, params))
}

fn demo_presence_board() -> PresenceBoard {
    let mut board = PresenceBoard::new();
    board.push_count_display();
    board.push_badge(UserBadge::new("alice", "alice (question author)").with_indicator());
    board.push_badge(UserBadge::new("bob", "bob (top answer)").with_indicator());
    board.push_badge(UserBadge::new("carol", "carol (answer)").with_indicator());
    board.push_badge(UserBadge::new("dave", "dave (commenter)"));
    board.push_badge(UserBadge::new("alice", "alice (accepted answer)").with_indicator());
    board
}

fn demo_tag_cards() -> Vec<TagCard> {
    vec![
        TagCard::new(
            "rust",
            Some("Systems language focused on safety and speed".to_owned()),
        ),
        TagCard::new("java", None),
        TagCard::new("python", Some("High-level language named after a snake".to_owned())),
        TagCard::new(
            "networking",
            Some("Sockets, protocols and transport questions".to_owned()),
        ),
        TagCard::new("async", Some("Futures, executors and event loops".to_owned())),
        TagCard::new("terminal", None),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_context_without_question_flag_has_no_marker() {
        let page = build_page_context(None, &[]).expect("page context should build");

        assert!(page.marker().is_none());
        assert_eq!(page.resource_id(), None);
    }

    #[test]
    fn page_context_takes_the_id_from_the_question_flag() {
        let page = build_page_context(Some(Some("17".to_owned())), &[])
            .expect("page context should build");

        assert_eq!(page.resource_id(), Some("17"));
    }

    #[test]
    fn bare_question_flag_falls_back_to_page_parameters() {
        let page = build_page_context(Some(None), &["id=99".to_owned()])
            .expect("page context should build");

        assert!(page.marker().is_some());
        assert_eq!(page.resource_id(), Some("99"));
    }

    #[test]
    fn malformed_page_parameters_are_rejected() {
        let outcome = build_page_context(None, &["not-a-pair".to_owned()]);

        assert!(outcome.is_err());
    }

    #[test]
    fn demo_board_shows_a_user_in_more_than_one_place() {
        let board = demo_presence_board();

        let alice_badges = board
            .badges()
            .iter()
            .filter(|badge| badge.user_id() == "alice")
            .count();
        assert!(alice_badges > 1);
        assert_eq!(board.count_displays().len(), 1);
    }
}
