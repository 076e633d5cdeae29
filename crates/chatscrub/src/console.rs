//! Interactive console: runs commands against an origin store and renders
//! result pages as text.

use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use chatscrub_core::{
    CheckEvent, Container, DeletionOutcome, ExclusionStore, Keyword, MemoryOrigin, OriginStore,
    ProgressReporter, RenderedPage, ResultBrowser, ScanEvent, ScanReport, Scanner, ScopeId,
    SystemClock, delete_selected, diagnose, highlight_spans, progress_channel,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::command::{Command, ContainerRef, FindArgs};
use crate::settings::{PAGE_SIZE_CHOICES, ScrubSettings};

/// Whether the console keeps reading commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// Stop.
    Quit,
}

/// Console session state.
pub struct Console<W> {
    origin: MemoryOrigin,
    export_path: Option<PathBuf>,
    exclusions: ExclusionStore,
    settings: ScrubSettings,
    browser: ResultBrowser,
    keywords: Vec<Keyword>,
    progress: ProgressReporter<SystemClock>,
    out: W,
}

impl<W: Write + Send> Console<W> {
    /// Creates a console over an origin store.
    pub fn new(
        origin: MemoryOrigin,
        exclusions: ExclusionStore,
        settings: ScrubSettings,
        out: W,
    ) -> Self {
        let (_, receiver) = progress_channel();
        Self {
            origin,
            export_path: None,
            exclusions,
            browser: ResultBrowser::new(settings.page_size),
            settings,
            keywords: Vec::new(),
            progress: ProgressReporter::new(receiver, SystemClock),
            out,
        }
    }

    /// Writes the origin back to `path` after successful deletions.
    #[must_use]
    pub fn with_export_path(mut self, path: PathBuf) -> Self {
        self.export_path = Some(path);
        self
    }

    /// Reads commands from `input` until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> anyhow::Result<()> {
        writeln!(
            self.out,
            "Loaded scope {} ({}). Type `help` for commands.",
            self.origin.scope_name(),
            self.origin.scope()
        )?;

        let mut lines = input.lines();
        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;

            let Some(line) = lines.next_line().await.context("Failed to read command")? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            if self.execute_line(&line).await? == Flow::Quit {
                break;
            }
        }

        info!("Console closed");
        Ok(())
    }

    /// Parses and executes one line. Parse errors are printed, not returned.
    ///
    /// # Errors
    ///
    /// Returns an error if writing output fails.
    pub async fn execute_line(&mut self, line: &str) -> anyhow::Result<Flow> {
        match Command::parse(line) {
            Ok(command) => self.execute(command).await,
            Err(e) => {
                writeln!(self.out, "{e}")?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Executes a parsed command.
    ///
    /// # Errors
    ///
    /// Returns an error if writing output fails.
    pub async fn execute(&mut self, command: Command) -> anyhow::Result<Flow> {
        let scope = self.origin.scope();
        match command {
            Command::Find(args) => self.find(args).await?,
            Command::AddExclude { keyword, words } => {
                let outcome = self
                    .exclusions
                    .add(scope, &keyword, words.iter().map(String::as_str))
                    .await;
                self.report_added(&keyword, outcome)?;
            }
            Command::BulkExclude { keyword, words } => {
                let outcome = self.exclusions.bulk_add(scope, &keyword, &words).await;
                self.report_added(&keyword, outcome)?;
            }
            Command::RemoveExclude { keyword, word } => {
                self.remove_exclusion(scope, &keyword, word.as_deref())
                    .await?;
            }
            Command::ListExcludes { keyword } => self.list_exclusions(scope, keyword.as_deref())?,
            Command::TestKeyword { keyword, sample } => {
                self.test_keyword(scope, &keyword, &sample)?;
            }
            Command::Page(page) => {
                let page = self.browser.go_to_page(page);
                self.show(&page)?;
            }
            Command::Next => {
                let page = self.browser.next_page();
                self.show(&page)?;
            }
            Command::Prev => {
                let page = self.browser.prev_page();
                self.show(&page)?;
            }
            Command::PageSize(size) => {
                let page = self.browser.change_page_size(size);
                self.show(&page)?;
            }
            Command::Check(indices) => self.set_checked(&indices, true)?,
            Command::Uncheck(indices) => self.set_checked(&indices, false)?,
            Command::CheckAll => {
                let page = self.browser.toggle_all(true);
                self.show(&page)?;
            }
            Command::UncheckAll => {
                let page = self.browser.toggle_all(false);
                self.show(&page)?;
            }
            Command::Show => {
                let page = self.browser.current();
                self.show(&page)?;
            }
            Command::Delete => self.delete().await?,
            Command::Progress => writeln!(self.out, "{}", self.progress.view())?,
            Command::Help => self.help()?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn find(&mut self, args: FindArgs) -> anyhow::Result<()> {
        let keywords = Keyword::parse_all(args.keywords.iter().map(String::as_str));
        if keywords.is_empty() {
            writeln!(self.out, "No usable keywords given.")?;
            return Ok(());
        }

        let available = match self.origin.list_containers().await {
            Ok(available) => available,
            Err(e) => {
                writeln!(self.out, "Could not list channels: {e}")?;
                return Ok(());
            }
        };
        let (containers, unknown) = resolve_containers(&available, &args.containers);
        for reference in &unknown {
            warn!(channel = %reference, "Unknown channel");
            writeln!(self.out, "Unknown channel {reference}, skipping.")?;
        }
        if containers.is_empty() {
            writeln!(
                self.out,
                "No valid channels specified. Please mention channels using `#channel-name` or `<#channel_id>`."
            )?;
            return Ok(());
        }

        let mut config = self.settings.scan_config();
        if let Some(limit) = args.limit {
            config = config.with_result_cap(limit);
        }

        writeln!(
            self.out,
            "Searching for messages with keywords: `{}` in {} channels. Please wait...",
            keywords.iter().map(Keyword::as_str).collect::<Vec<_>>().join(", "),
            containers.len()
        )?;

        self.browser.reset();
        self.keywords.clone_from(&keywords);

        let (progress_tx, progress_rx) = progress_channel();
        self.progress = ProgressReporter::new(progress_rx, SystemClock);

        let mut ticker = tokio::time::interval(self.settings.progress_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await;

        let (events_tx, mut events) = mpsc::unbounded_channel();
        let report = {
            let scanner = Scanner::new(&self.origin, &self.exclusions, config, events_tx)
                .with_progress(progress_tx);
            let scan = scanner.scan(&containers, &keywords);
            tokio::pin!(scan);

            loop {
                tokio::select! {
                    report = &mut scan => break report,
                    Some(event) = events.recv() => {
                        apply_scan_event(&mut self.browser, &mut self.out, event)?;
                    }
                    _ = ticker.tick() => {
                        let view = self.progress.view();
                        writeln!(self.out, "{} {}", view.status, view.details.join(" | "))?;
                    }
                }
            }
        };

        while let Ok(event) = events.try_recv() {
            apply_scan_event(&mut self.browser, &mut self.out, event)?;
        }

        self.report_search(&report)
    }

    fn report_search(&mut self, report: &ScanReport) -> anyhow::Result<()> {
        let matched = report.session.matched;
        if report.cap_reached {
            writeln!(
                self.out,
                "Search stopped after finding {matched} messages (maximum limit). Try a more specific search."
            )?;
        } else {
            writeln!(self.out, "Search complete! Found {matched} messages matching your keywords.")?;
        }
        writeln!(self.out, "{}", self.progress.view())?;

        let page = self.browser.current();
        self.show(&page)
    }

    async fn delete(&mut self) -> anyhow::Result<()> {
        let selected = self.browser.selected_handles();
        if selected.is_empty() {
            writeln!(self.out, "{}", DeletionOutcome::NothingSelected)?;
            return Ok(());
        }

        writeln!(self.out, "Deleting {} messages...", selected.len())?;
        let out = &mut self.out;
        let report = delete_selected(&self.origin, &selected, |progress| {
            if let Err(e) = writeln!(out, "{progress}") {
                debug!(error = %e, "Failed to write deletion progress");
            }
        })
        .await;

        for failure in &report.failures {
            writeln!(
                self.out,
                "Could not delete message {} in #{}: {}",
                failure.handle.id, failure.handle.container_name, failure.message
            )?;
        }

        let page = self.browser.apply_deletion(&report);
        writeln!(self.out, "{}", report.outcome())?;

        if !report.succeeded.is_empty()
            && let Some(path) = &self.export_path
        {
            if let Err(e) = self.origin.to_export().save(path).await {
                warn!(path = %path.display(), error = %e, "Failed to write export");
                writeln!(self.out, "Warning: could not update {}: {e}", path.display())?;
            } else {
                info!(path = %path.display(), "Export updated");
            }
        }

        self.show(&page)
    }

    fn set_checked(&mut self, indices: &[usize], checked: bool) -> anyhow::Result<()> {
        for &index in indices {
            let on_page = self
                .browser
                .results()
                .get(index)
                .map(|record| CheckEvent {
                    id: record.id(),
                    checked,
                })
                .is_some_and(|event| self.browser.apply_check(event));
            if !on_page {
                writeln!(self.out, "Result {index} is not on the current page.")?;
            }
        }
        let page = self.browser.current();
        self.show(&page)
    }

    fn show(&mut self, page: &RenderedPage) -> anyhow::Result<()> {
        writeln!(self.out, "{}", page.info)?;
        for item in &page.items {
            let mark = if item.checked { 'x' } else { ' ' };
            writeln!(
                self.out,
                "[{mark}] {:>4}. {}",
                item.record.index(),
                highlight(item.record.text(), &self.keywords)
            )?;
        }
        if page.info.has_prev() || page.info.has_next() {
            writeln!(self.out, "(prev / next / page <n>)")?;
        }
        Ok(())
    }

    fn report_added(
        &mut self,
        keyword: &str,
        outcome: chatscrub_core::Result<chatscrub_core::AddOutcome>,
    ) -> anyhow::Result<()> {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                writeln!(self.out, "{e}")?;
                return Ok(());
            }
        };
        let keyword = keyword.trim().to_lowercase();

        if !outcome.added.is_empty() {
            writeln!(
                self.out,
                "Added exclusions for `{keyword}`: {}",
                outcome.added.join(", ")
            )?;
        }
        if !outcome.already_present.is_empty() {
            writeln!(
                self.out,
                "Already excluded for `{keyword}`: {}",
                outcome.already_present.join(", ")
            )?;
        }
        if outcome.added.is_empty() && outcome.already_present.is_empty() {
            writeln!(self.out, "No exclusion words given.")?;
        }
        if !outcome.persisted {
            writeln!(
                self.out,
                "Warning: could not save exclusion lists; changes are kept for this session."
            )?;
        }
        Ok(())
    }

    async fn remove_exclusion(
        &mut self,
        scope: ScopeId,
        keyword: &str,
        word: Option<&str>,
    ) -> anyhow::Result<()> {
        let outcome = match self.exclusions.remove(scope, keyword, word).await {
            Ok(outcome) => outcome,
            Err(e) => {
                writeln!(self.out, "{e}")?;
                return Ok(());
            }
        };
        let keyword = keyword.trim().to_lowercase();

        match (word, outcome.removed.is_empty()) {
            (Some(word), true) => {
                writeln!(self.out, "`{word}` is not an exclusion for `{keyword}`.")?;
            }
            (None, true) => writeln!(self.out, "No exclusions registered for `{keyword}`.")?,
            (Some(_), false) => writeln!(
                self.out,
                "Removed exclusion `{}` from `{keyword}`.",
                outcome.removed.join(", ")
            )?,
            (None, false) => writeln!(
                self.out,
                "Cleared all exclusions for `{keyword}` ({}).",
                outcome.removed.join(", ")
            )?,
        }
        if !outcome.persisted {
            writeln!(
                self.out,
                "Warning: could not save exclusion lists; changes are kept for this session."
            )?;
        }
        Ok(())
    }

    fn list_exclusions(&mut self, scope: ScopeId, keyword: Option<&str>) -> anyhow::Result<()> {
        let lists = self.exclusions.list(scope, keyword);
        if lists.is_empty() {
            match keyword {
                Some(keyword) => writeln!(self.out, "No exclusions registered for `{keyword}`.")?,
                None => writeln!(self.out, "No exclusions registered.")?,
            }
            return Ok(());
        }
        for list in lists {
            writeln!(self.out, "`{}`: {}", list.keyword, list.words.join(", "))?;
        }
        Ok(())
    }

    fn test_keyword(&mut self, scope: ScopeId, keyword: &str, sample: &str) -> anyhow::Result<()> {
        let diagnosis = diagnose(keyword, sample, self.exclusions.scope(scope));
        let shown = &diagnosis.keyword;

        if diagnosis.is_match() {
            writeln!(self.out, "Keyword `{shown}` MATCHES in the sample text.")?;
        } else if let Some(exclusion) = &diagnosis.excluded_by {
            writeln!(
                self.out,
                "Keyword `{shown}` occurs but is excluded by `{exclusion}`."
            )?;
        } else {
            writeln!(self.out, "Keyword `{shown}` does NOT match in the sample text.")?;
        }

        writeln!(self.out, "Keyword character codes: `{}`", diagnosis.keyword_codes)?;
        if let Some(snippet) = &diagnosis.snippet_codes {
            writeln!(self.out, "Sample text snippet character codes: `{snippet}`")?;
        }
        Ok(())
    }

    fn help(&mut self) -> anyhow::Result<()> {
        let sizes = PAGE_SIZE_CHOICES.map(|n| n.to_string()).join("/");
        writeln!(
            self.out,
            "\
Search:
  find <keyword...> <#channel|<#id>...> [limit=N]
  testkeyword <keyword> <sample text>
Exclusions:
  addexclude <keyword> <word...>
  bulkexclude <keyword> <word1, word2, ...>
  removeexclude <keyword> [word]
  listexcludes [keyword]
Results:
  show | next | prev | page <n> | pagesize <n> ({sizes})
  check <index...> | uncheck <index...> | checkall | uncheckall
  delete | progress | quit"
        )?;
        Ok(())
    }
}

/// Resolves channel references against the listed containers.
///
/// Returns the distinct matches in reference order, plus the references
/// that matched nothing.
fn resolve_containers(
    available: &[Container],
    refs: &[ContainerRef],
) -> (Vec<Container>, Vec<String>) {
    let mut resolved: Vec<Container> = Vec::new();
    let mut unknown = Vec::new();

    for reference in refs {
        let found = available.iter().find(|c| match reference {
            ContainerRef::Name(name) => c.name == *name,
            ContainerRef::Id(id) => c.id == *id,
        });
        match found {
            Some(container) if !resolved.contains(container) => resolved.push(container.clone()),
            Some(_) => {}
            None => unknown.push(match reference {
                ContainerRef::Name(name) => format!("#{name}"),
                ContainerRef::Id(id) => format!("<#{id}>"),
            }),
        }
    }
    (resolved, unknown)
}

fn apply_scan_event<W: Write>(
    browser: &mut ResultBrowser,
    out: &mut W,
    event: ScanEvent,
) -> anyhow::Result<()> {
    match event {
        ScanEvent::Batch(batch) => {
            browser.append(batch);
        }
        ScanEvent::ContainerFailed(failure) if failure.is_permission_denied() => {
            writeln!(out, "No permission to read messages in #{}", failure.container)?;
        }
        ScanEvent::ContainerFailed(failure) => {
            writeln!(
                out,
                "Could not read messages in #{}: {}",
                failure.container, failure.error
            )?;
        }
        ScanEvent::ContainerStarted { .. } | ScanEvent::CapReached { .. } => {}
    }
    Ok(())
}

/// Wraps keyword occurrences in `**`.
fn highlight(text: &str, keywords: &[Keyword]) -> String {
    let mut marked = String::with_capacity(text.len() + 8);
    let mut last = 0;
    for span in highlight_spans(text, keywords) {
        let (Some(before), Some(hit)) = (text.get(last..span.start), text.get(span.clone())) else {
            continue;
        };
        let _ = write!(marked, "{before}**{hit}**");
        last = span.end;
    }
    marked.push_str(text.get(last..).unwrap_or_default());
    marked
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chatscrub_core::{ArchiveExport, ContainerId, OriginError};

    const GUILD: ScopeId = ScopeId(9);

    fn console(origin: MemoryOrigin) -> Console<Vec<u8>> {
        Console::new(
            origin,
            ExclusionStore::in_memory(),
            ScrubSettings {
                page_size: 10,
                ..ScrubSettings::default()
            },
            Vec::new(),
        )
    }

    fn output(console: &mut Console<Vec<u8>>) -> String {
        String::from_utf8(std::mem::take(&mut console.out)).unwrap()
    }

    fn sample_origin() -> MemoryOrigin {
        let mut origin = MemoryOrigin::new(GUILD, "guild");
        let general = origin.add_container(ContainerId(1), "general");
        let secret = origin.add_container(ContainerId(2), "secret");
        for n in 0..12 {
            origin.push_message(general.id, "bob", &format!("selling alt #{n}"));
        }
        origin.push_message(general.id, "amy", "the alt was altered");
        origin.push_message(secret.id, "mod", "alt");
        origin.fail_history(secret.id, OriginError::PermissionDenied("Missing Access".into()));
        origin
    }

    #[tokio::test]
    async fn test_find_reports_and_shows_first_page() {
        let mut console = console(sample_origin());
        console.execute_line("!addexclude alt altered").await.unwrap();
        output(&mut console);

        console
            .execute_line("find alt #general #secret #missing")
            .await
            .unwrap();
        let text = output(&mut console);

        assert!(text.contains("Unknown channel #missing, skipping."));
        assert!(text.contains("in 2 channels"));
        assert!(text.contains("No permission to read messages in #secret"));
        assert!(text.contains("Search complete! Found 12 messages"));
        assert!(text.contains("Showing 1-10 of 12 results (Page 1 of 2)"));
        assert!(text.contains("[ ]    1. [general] bob: selling **alt** #0"));
    }

    #[tokio::test]
    async fn test_find_with_limit_reports_cap() {
        let mut console = console(sample_origin());
        console.execute_line("find alt #general limit=3").await.unwrap();
        let text = output(&mut console);
        assert!(text.contains("Search stopped after finding 3 messages (maximum limit)"));
    }

    #[tokio::test]
    async fn test_find_without_valid_channel_is_rejected() {
        let mut console = console(sample_origin());
        console.execute_line("find alt #nowhere").await.unwrap();
        let text = output(&mut console);
        assert!(text.contains("No valid channels specified."));
        assert!(!text.contains("Searching for"));
    }

    #[tokio::test]
    async fn test_check_and_delete() {
        let mut console = console(sample_origin());
        console.execute_line("find alt #general").await.unwrap();
        console.execute_line("check 1 2 11").await.unwrap();
        let text = output(&mut console);
        assert!(text.contains("Result 11 is not on the current page."));
        assert!(text.contains("[x]    2."));

        console.execute_line("delete").await.unwrap();
        let text = output(&mut console);
        assert!(text.contains("Deleting messages... (2/2)"));
        assert!(text.contains("Successfully deleted 2 messages!"));
        assert!(text.contains("Showing 1-10 of 11 results (Page 1 of 2)"));

        console.execute_line("delete").await.unwrap();
        assert!(output(&mut console).contains("No messages selected."));
    }

    /// Output sink that rejects deletion progress lines.
    #[derive(Default)]
    struct RejectProgress(Vec<u8>);

    impl Write for RejectProgress {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if buf.starts_with(b"Deleting messages... (") {
                return Err(std::io::Error::other("terminal closed"));
            }
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_progress_write_failure_does_not_stop_deletion() {
        let mut console = Console::new(
            sample_origin(),
            ExclusionStore::in_memory(),
            ScrubSettings::default(),
            RejectProgress::default(),
        );
        console.execute_line("find alt #general").await.unwrap();
        console.execute_line("check 1 2").await.unwrap();
        console.execute_line("delete").await.unwrap();

        let text = String::from_utf8(std::mem::take(&mut console.out.0)).unwrap();
        assert!(!text.contains("Deleting messages... ("));
        assert!(text.contains("Successfully deleted 2 messages!"));
        assert_eq!(console.origin.message_count(ContainerId(1)), 11);
    }

    #[tokio::test]
    async fn test_delete_writes_export_back() {
        let dir = std::env::temp_dir().join(format!("chatscrub-console-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("export.json");

        let mut console = console(sample_origin()).with_export_path(path.clone());
        console.execute_line("find alt #general").await.unwrap();
        console.execute_line("check 1").await.unwrap();
        console.execute_line("delete").await.unwrap();
        assert!(output(&mut console).contains("Successfully deleted 1 messages!"));

        let saved = ArchiveExport::load(&path).await.unwrap();
        assert_eq!(saved.containers[0].messages.len(), 12);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_exclusion_commands() {
        let mut console = console(sample_origin());

        console
            .execute_line("bulkexclude ALT altered, alternative")
            .await
            .unwrap();
        assert!(output(&mut console).contains("Added exclusions for `alt`: altered, alternative"));

        console.execute_line("addexclude alt altered").await.unwrap();
        assert!(output(&mut console).contains("Already excluded for `alt`: altered"));

        console.execute_line("listexcludes").await.unwrap();
        assert!(output(&mut console).contains("`alt`: altered, alternative"));

        console.execute_line("removeexclude alt altered").await.unwrap();
        assert!(output(&mut console).contains("Removed exclusion `altered` from `alt`."));

        console.execute_line("removeexclude alt").await.unwrap();
        assert!(output(&mut console).contains("Cleared all exclusions for `alt` (alternative)."));

        console.execute_line("listexcludes alt").await.unwrap();
        assert!(output(&mut console).contains("No exclusions registered for `alt`."));
    }

    #[tokio::test]
    async fn test_testkeyword_output() {
        let mut console = console(sample_origin());
        console.execute_line("testkeyword Alt this is ALT").await.unwrap();
        let text = output(&mut console);
        assert!(text.contains("Keyword `alt` MATCHES in the sample text."));
        assert!(text.contains("Keyword character codes: `61 6c 74`"));

        console.execute_line("addexclude alt altered").await.unwrap();
        console.execute_line("testkeyword alt altered").await.unwrap();
        assert!(output(&mut console).contains("excluded by `altered`"));
    }

    #[tokio::test]
    async fn test_usage_errors_are_printed() {
        let mut console = console(sample_origin());
        let flow = console.execute_line("page zero").await.unwrap();
        assert_eq!(flow, Flow::Continue);
        assert!(output(&mut console).contains("Invalid number `zero`"));
        assert_eq!(console.execute_line("quit").await.unwrap(), Flow::Quit);
    }

    #[tokio::test]
    async fn test_run_reads_until_quit() {
        let mut console = console(sample_origin());
        let input: &[u8] = b"help\n\nprogress\nquit\nshow\n";
        console.run(input).await.unwrap();
        let text = output(&mut console);
        assert!(text.contains("pagesize <n> (10/25/50/100)"));
        assert!(text.contains("Ready"));
        assert!(!text.contains("No results\n> "));
    }

    #[test]
    fn test_resolve_containers_dedups_and_reports_unknown() {
        let available = vec![
            Container {
                id: ContainerId(1),
                name: "general".into(),
                scope: GUILD,
            },
            Container {
                id: ContainerId(2),
                name: "memes".into(),
                scope: GUILD,
            },
        ];
        let refs = [
            ContainerRef::Id(ContainerId(2)),
            ContainerRef::Name("general".into()),
            ContainerRef::Name("memes".into()),
            ContainerRef::Id(ContainerId(77)),
        ];

        let (resolved, unknown) = resolve_containers(&available, &refs);
        let names: Vec<_> = resolved.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["memes", "general"]);
        assert_eq!(unknown, vec!["<#77>"]);
    }

    #[test]
    fn test_highlight() {
        let keywords = Keyword::parse_all(["alt"]);
        assert_eq!(highlight("Alt and alt", &keywords), "**Alt** and **alt**");
        assert_eq!(highlight("nothing", &keywords), "nothing");
    }
}
