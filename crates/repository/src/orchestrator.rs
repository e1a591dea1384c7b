//! Repository Orchestrator
//!
//! Runs one listing:
//! - fetches the two root manifests together
//! - reads the add-on and system image sites from the add-ons list
//! - fetches every discovered site together
//! - renders every record of every loaded manifest
//!
//! Each phase waits for all of its fetches to settle before the next one
//! starts. A failed fetch or parse only removes that manifest from the
//! listing.

use futures::future::join_all;
use parking_lot::Mutex;
use sdk_client_core::{ClientConfig, Result, SdkClientError};
use sdk_client_manifest::{ManifestKind, ManifestParser, Node, RecordFormatter};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use url::Url;

use crate::export::ExportSink;
use crate::fetcher::ManifestFetcher;
use crate::source::ManifestSource;

/// Receives every line of listing output
pub type OutputCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Final progress line of a run
pub const DONE_MESSAGE: &str = "Done loading packages.";

const ADDONS_LIST_ROOT: &str = "sdk:sdk-addons-list";

/// Site lists in the add-ons list, in discovery order
const SITE_TAGS: [&str; 2] = ["sdk:addon-site", "sdk:sys-img-site"];

/// Orchestrates fetching and listing for one run
pub struct RepositoryOrchestrator<F: ManifestFetcher> {
    fetcher: F,
    config: ClientConfig,
    formatter: RecordFormatter,
    exporter: Option<ExportSink>,
    /// Export writes started so far, drained by `finish_exports`
    pending_exports: Mutex<Vec<JoinHandle<()>>>,
    output: OutputCallback,
}

impl<F: ManifestFetcher> RepositoryOrchestrator<F> {
    /// Create an orchestrator that prints to stdout
    pub fn new(fetcher: F, config: ClientConfig) -> Self {
        let exporter = config
            .export
            .enabled
            .then(|| ExportSink::new(config.export.directory.clone()));

        Self {
            fetcher,
            formatter: RecordFormatter::new(config.display),
            exporter,
            pending_exports: Mutex::new(Vec::new()),
            config,
            output: Box::new(|line| println!("{}", line)),
        }
    }

    /// Send output somewhere other than stdout
    pub fn with_output(mut self, output: OutputCallback) -> Self {
        self.output = output;
        self
    }

    fn emit(&self, line: &str) {
        (self.output)(line);
    }

    /// The two fixed root manifests
    pub fn root_sources(&self) -> Vec<ManifestSource> {
        vec![
            ManifestSource::new(&self.config.sources.repository_url, "SDK Repository"),
            ManifestSource::new(&self.config.sources.addons_list_url, "Add-ons List"),
        ]
    }

    /// Run both fetch phases, print the listing, and return every source
    pub async fn run(&self) -> Vec<ManifestSource> {
        let roots = self.fetch_all(self.root_sources()).await;

        let discovered = roots
            .iter()
            .find(|source| source.url == self.config.sources.addons_list_url)
            .map(|addons_list| match discover(addons_list) {
                Ok(discovered) => discovered,
                Err(e) => {
                    warn!(
                        "No add-on sites discovered from {}: {}",
                        addons_list.url,
                        e.user_message()
                    );
                    Vec::new()
                }
            })
            .unwrap_or_default();
        debug!("Discovered {} add-on and system image sites", discovered.len());

        let discovered = self.fetch_all(discovered).await;

        let mut sources = roots;
        sources.extend(discovered);

        self.render(&sources);
        self.emit(DONE_MESSAGE);
        sources
    }

    /// Fetch and parse every source concurrently, waiting for all of them
    pub async fn fetch_all(&self, sources: Vec<ManifestSource>) -> Vec<ManifestSource> {
        join_all(sources.into_iter().map(|source| self.fetch_source(source))).await
    }

    /// Fetch, parse and optionally export one source. Failures are logged
    /// and leave the source without a document.
    pub async fn fetch_source(&self, mut source: ManifestSource) -> ManifestSource {
        self.emit(&format!("Fetching URL: {}", source.url));
        let response = match self.fetcher.fetch(&source.url).await {
            Ok(response) => response,
            Err(e) => {
                error!(
                    "Failed to fetch {}: {}",
                    source.url,
                    SdkClientError::from(e).user_message()
                );
                return source;
            }
        };

        self.emit(&format!("Parse XML:    {}", source.url));
        match ManifestParser::parse_bytes(&response.body) {
            Ok(document) => source.document = Some(document),
            Err(e) => error!(
                "Failed to parse {}: {}",
                source.url,
                SdkClientError::from(e).user_message()
            ),
        }
        source.raw_body = Some(response.body);

        if let (Some(exporter), true) = (&self.exporter, source.is_parsed()) {
            // Detached: the listing never waits for exports
            if let Some(handle) = exporter.spawn(&source) {
                self.pending_exports.lock().push(handle);
            }
        }
        source
    }

    /// Wait for export writes that are still running. Call after the
    /// listing has been printed; write failures were already logged.
    pub async fn finish_exports(&self) {
        let pending = std::mem::take(&mut *self.pending_exports.lock());
        for result in join_all(pending).await {
            if let Err(e) = result {
                warn!("Export task did not complete: {}", e);
            }
        }
    }

    /// Print the records of every loaded source
    pub fn render(&self, sources: &[ManifestSource]) {
        for source in sources {
            for block in self.render_source(source) {
                self.emit(&block);
            }
        }
    }

    /// Rendered records of one source, grouped by component type in
    /// listing order and in document order within a type
    pub fn render_source(&self, source: &ManifestSource) -> Vec<String> {
        let Some(document) = &source.document else {
            return Vec::new();
        };
        let Some(kind) = ManifestKind::of(document) else {
            debug!("{} has no listable records (<{}>)", source.url, document.root_name);
            return Vec::new();
        };

        let mut blocks = Vec::new();
        for component_type in kind.component_types() {
            for record in document.root.children(component_type.element_name()) {
                let name = component_type.display_name(record);
                if let Some(block) =
                    self.formatter.format(record, &source.url, *component_type, &name)
                {
                    blocks.push(block);
                }
            }
        }
        blocks
    }
}

/// Sources listed by an add-ons list manifest. Site URLs are resolved
/// against the add-ons list's own URL.
pub fn discover(addons_list: &ManifestSource) -> Result<Vec<ManifestSource>> {
    let document = addons_list.document.as_ref().ok_or_else(|| {
        SdkClientError::InvalidStructure(format!("{} was not loaded", addons_list.url))
    })?;
    if document.root_name != ADDONS_LIST_ROOT {
        return Err(SdkClientError::InvalidStructure(format!(
            "expected <{}>, found <{}>",
            ADDONS_LIST_ROOT, document.root_name
        )));
    }

    let base = Url::parse(&addons_list.url)?;
    let mut discovered = Vec::new();
    for tag in SITE_TAGS {
        let sites = document.root.children(tag);
        if sites.is_empty() {
            warn!("{} lists no {} entries", addons_list.url, tag);
        }
        for site in sites {
            match site_source(site, &base) {
                Ok(source) => discovered.push(source),
                Err(e) => warn!(
                    "Skipping {} entry in {}: {}",
                    tag,
                    addons_list.url,
                    e.user_message()
                ),
            }
        }
    }
    Ok(discovered)
}

fn site_source(site: &Node, base: &Url) -> Result<ManifestSource> {
    let location = site
        .child("sdk:url")
        .ok_or_else(|| SdkClientError::MissingField("sdk:url".to_string()))?;
    let url = base.join(location.text().trim())?;
    Ok(ManifestSource::new(url.to_string(), site.field("sdk:name")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use sdk_client_core::SourceConfig;

    use crate::fetcher::{FetchError, FetchResponse};

    const REPOSITORY_URL: &str = "https://repo.test/android/repository/repository-11.xml";
    const ADDONS_LIST_URL: &str = "https://repo.test/android/repository/addons_list-2.xml";
    const ADDON_URL: &str = "https://repo.test/android/repository/addon.xml";
    const SYS_IMG_URL: &str = "https://repo.test/android/repository/sys-img/x86/sys-img.xml";

    const REPOSITORY: &str = r#"<sdk:sdk-repository xmlns:sdk="http://schemas.android.com/sdk/android/repository/11">
        <sdk:platform>
            <sdk:version>4.4.2</sdk:version>
            <sdk:api-level>19</sdk:api-level>
            <sdk:revision>4</sdk:revision>
        </sdk:platform>
        <sdk:platform>
            <sdk:version>2.1</sdk:version>
            <sdk:api-level>7</sdk:api-level>
            <sdk:revision>3</sdk:revision>
            <sdk:obsolete/>
        </sdk:platform>
        <sdk:tool>
            <sdk:revision><sdk:major>24</sdk:major><sdk:minor>4</sdk:minor><sdk:micro>1</sdk:micro></sdk:revision>
        </sdk:tool>
        <sdk:platform-tool>
            <sdk:revision><sdk:major>23</sdk:major><sdk:minor>1</sdk:minor></sdk:revision>
        </sdk:platform-tool>
    </sdk:sdk-repository>"#;

    const ADDONS_LIST: &str = r#"<sdk:sdk-addons-list xmlns:sdk="http://schemas.android.com/sdk/android/addons-list/2">
        <sdk:addon-site>
            <sdk:url>addon.xml</sdk:url>
            <sdk:name>Google Inc.</sdk:name>
        </sdk:addon-site>
        <sdk:sys-img-site>
            <sdk:url>sys-img/x86/sys-img.xml</sdk:url>
            <sdk:name>Intel HAXM</sdk:name>
        </sdk:sys-img-site>
    </sdk:sdk-addons-list>"#;

    const ADDON: &str = r#"<sdk:sdk-addon>
        <sdk:add-on>
            <sdk:name-display>Google APIs</sdk:name-display>
            <sdk:api-level>19</sdk:api-level>
            <sdk:revision>20</sdk:revision>
        </sdk:add-on>
        <sdk:extra>
            <sdk:name-display>Google Play services</sdk:name-display>
            <sdk:path>google_play_services</sdk:path>
            <sdk:revision><sdk:major>29</sdk:major></sdk:revision>
        </sdk:extra>
    </sdk:sdk-addon>"#;

    const SYS_IMG: &str = r#"<sdk:sdk-sys-img>
        <sdk:system-image>
            <sdk:api-level>21</sdk:api-level>
            <sdk:abi>x86</sdk:abi>
            <sdk:revision>4</sdk:revision>
        </sdk:system-image>
    </sdk:sdk-sys-img>"#;

    /// Serves canned bodies and records when each fetch starts and ends
    struct RecordingFetcher {
        responses: HashMap<String, &'static str>,
        events: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingFetcher {
        fn new(responses: &[(&str, &'static str)]) -> Self {
            Self {
                responses: responses
                    .iter()
                    .map(|(url, body)| (url.to_string(), *body))
                    .collect(),
                events: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl ManifestFetcher for RecordingFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<FetchResponse, FetchError> {
            self.events.lock().push(format!("start {}", url));
            tokio::task::yield_now().await;
            self.events.lock().push(format!("end {}", url));

            match self.responses.get(url) {
                Some(body) => Ok(FetchResponse {
                    status: 200,
                    body: body.as_bytes().to_vec(),
                    response_url: url.to_string(),
                }),
                None => Err(FetchError::Status {
                    status: 404,
                    url: url.to_string(),
                }),
            }
        }
    }

    fn test_config() -> ClientConfig {
        ClientConfig {
            sources: SourceConfig {
                repository_url: REPOSITORY_URL.to_string(),
                addons_list_url: ADDONS_LIST_URL.to_string(),
            },
            ..Default::default()
        }
    }

    fn orchestrator(
        fetcher: RecordingFetcher,
        config: ClientConfig,
    ) -> (RepositoryOrchestrator<RecordingFetcher>, Arc<Mutex<Vec<String>>>) {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        let orchestrator = RepositoryOrchestrator::new(fetcher, config)
            .with_output(Box::new(move |line| sink.lock().push(line.to_string())));
        (orchestrator, lines)
    }

    fn records(lines: &[String]) -> Vec<&str> {
        lines
            .iter()
            .map(String::as_str)
            .filter(|line| line.starts_with(" - "))
            .collect()
    }

    fn all_manifests() -> RecordingFetcher {
        RecordingFetcher::new(&[
            (REPOSITORY_URL, REPOSITORY),
            (ADDONS_LIST_URL, ADDONS_LIST),
            (ADDON_URL, ADDON),
            (SYS_IMG_URL, SYS_IMG),
        ])
    }

    #[tokio::test]
    async fn test_full_listing() {
        let (orchestrator, lines) = orchestrator(all_manifests(), test_config());
        let sources = orchestrator.run().await;

        assert_eq!(sources.len(), 4);
        assert!(sources.iter().all(ManifestSource::is_parsed));

        let lines = lines.lock();
        assert_eq!(
            records(&lines),
            vec![
                " - SDK Platform Android 4.4.2, revision 4",
                " - Android SDK Platform-tools, revision 23.1",
                " - Android SDK Tools, revision 24.4.1",
                " - Google APIs, Android API 19, revision 20",
                " - Google Play services, revision 29",
                " - Intel x86 Atom System Image, Android API 21, revision 4",
            ]
        );
        assert_eq!(lines.last().map(String::as_str), Some(DONE_MESSAGE));
        assert!(lines.contains(&format!("Fetching URL: {}", SYS_IMG_URL)));
        assert!(lines.contains(&format!("Parse XML:    {}", ADDON_URL)));
    }

    #[tokio::test]
    async fn test_obsolete_records_listed_when_requested() {
        let mut config = test_config();
        config.display.show_obsolete = true;
        let (orchestrator, lines) = orchestrator(all_manifests(), config);
        orchestrator.run().await;

        let lines = lines.lock();
        assert!(records(&lines).contains(&" - SDK Platform Android 2.1, revision 3 (Obsolete)"));
    }

    #[tokio::test]
    async fn test_discovered_fetches_wait_for_roots() {
        let fetcher = all_manifests();
        let events = Arc::clone(&fetcher.events);
        let (orchestrator, _lines) = orchestrator(fetcher, test_config());
        orchestrator.run().await;

        let events = events.lock();
        let position = |event: String| events.iter().position(|e| *e == event).unwrap();

        let roots_settled = position(format!("end {}", REPOSITORY_URL))
            .max(position(format!("end {}", ADDONS_LIST_URL)));
        assert!(position(format!("start {}", ADDON_URL)) > roots_settled);
        assert!(position(format!("start {}", SYS_IMG_URL)) > roots_settled);

        // Both roots are in flight together
        assert!(position(format!("start {}", ADDONS_LIST_URL)) < position(format!("end {}", REPOSITORY_URL)));
    }

    #[tokio::test]
    async fn test_failed_repository_still_lists_addons() {
        let fetcher = RecordingFetcher::new(&[
            (ADDONS_LIST_URL, ADDONS_LIST),
            (ADDON_URL, ADDON),
            (SYS_IMG_URL, SYS_IMG),
        ]);
        let (orchestrator, lines) = orchestrator(fetcher, test_config());
        let sources = orchestrator.run().await;

        assert!(!sources[0].is_parsed());
        let lines = lines.lock();
        assert_eq!(records(&lines).len(), 3);
        assert_eq!(lines.last().map(String::as_str), Some(DONE_MESSAGE));
    }

    #[tokio::test]
    async fn test_failed_addons_list_skips_discovery() {
        let fetcher = RecordingFetcher::new(&[(REPOSITORY_URL, REPOSITORY)]);
        let events = Arc::clone(&fetcher.events);
        let (orchestrator, lines) = orchestrator(fetcher, test_config());
        let sources = orchestrator.run().await;

        assert_eq!(sources.len(), 2);
        assert_eq!(events.lock().len(), 4);
        assert_eq!(records(&lines.lock()).len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_manifest_is_skipped() {
        let fetcher = RecordingFetcher::new(&[
            (REPOSITORY_URL, "<sdk:sdk-repository><sdk:platform>"),
            (ADDONS_LIST_URL, ADDONS_LIST),
            (ADDON_URL, ADDON),
        ]);
        let (orchestrator, lines) = orchestrator(fetcher, test_config());
        let sources = orchestrator.run().await;

        assert!(sources[0].raw_body.is_some());
        assert!(!sources[0].is_parsed());
        assert_eq!(
            records(&lines.lock()),
            vec![
                " - Google APIs, Android API 19, revision 20",
                " - Google Play services, revision 29",
            ]
        );
    }

    #[tokio::test]
    async fn test_save_exports_every_parsed_source() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config();
        config.export.enabled = true;
        config.export.directory = dir.path().to_path_buf();

        let fetcher = RecordingFetcher::new(&[
            (REPOSITORY_URL, REPOSITORY),
            (ADDONS_LIST_URL, ADDONS_LIST),
            (ADDON_URL, ADDON),
        ]);
        let (orchestrator, _lines) = orchestrator(fetcher, config);
        orchestrator.run().await;
        orchestrator.finish_exports().await;

        let exported = dir.path().join("android/repository");
        assert!(exported.join("repository-11.xml").exists());
        assert!(exported.join("repository-11.json").exists());
        assert!(exported.join("addons_list-2.json").exists());
        assert!(exported.join("addon.json").exists());
        assert!(!exported.join("sys-img/x86/sys-img.json").exists());
    }

    fn addons_list_source(url: &str, xml: &str) -> ManifestSource {
        let mut source = ManifestSource::new(url, "Add-ons List");
        source.document = Some(ManifestParser::parse_string(xml).unwrap());
        source
    }

    #[test]
    fn test_discovery_resolves_against_list_url() {
        let source = addons_list_source(
            "https://mirror.test/custom/path/addons_list-2.xml",
            r#"<sdk:sdk-addons-list>
                <sdk:addon-site><sdk:url>addon-google.xml</sdk:url><sdk:name>Google</sdk:name></sdk:addon-site>
                <sdk:addon-site><sdk:url>https://vendor.test/repo/addon.xml</sdk:url><sdk:name>Vendor</sdk:name></sdk:addon-site>
                <sdk:sys-img-site><sdk:url>../images/sys-img.xml</sdk:url><sdk:name>Images</sdk:name></sdk:sys-img-site>
            </sdk:sdk-addons-list>"#,
        );

        let discovered = discover(&source).unwrap();
        let urls: Vec<&str> = discovered.iter().map(|s| s.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://mirror.test/custom/path/addon-google.xml",
                "https://vendor.test/repo/addon.xml",
                "https://mirror.test/custom/images/sys-img.xml",
            ]
        );
        assert_eq!(discovered[0].name, "Google");
    }

    #[test]
    fn test_discovery_skips_entries_without_url() {
        let source = addons_list_source(
            ADDONS_LIST_URL,
            r#"<sdk:sdk-addons-list>
                <sdk:addon-site><sdk:name>Broken</sdk:name></sdk:addon-site>
                <sdk:addon-site><sdk:url>addon.xml</sdk:url><sdk:name>Google</sdk:name></sdk:addon-site>
            </sdk:sdk-addons-list>"#,
        );

        let discovered = discover(&source).unwrap();
        assert_eq!(discovered.len(), 1);
        assert_eq!(discovered[0].url, ADDON_URL);
    }

    #[test]
    fn test_discovery_rejects_other_manifests() {
        let source = addons_list_source(ADDONS_LIST_URL, REPOSITORY);
        assert!(matches!(
            discover(&source),
            Err(SdkClientError::InvalidStructure(_))
        ));

        let unloaded = ManifestSource::new(ADDONS_LIST_URL, "Add-ons List");
        assert!(discover(&unloaded).is_err());
    }

    #[test]
    fn test_tools_listed_without_build_tools() {
        let (orchestrator, _lines) = orchestrator(all_manifests(), test_config());
        let mut source = ManifestSource::new(REPOSITORY_URL, "SDK Repository");
        source.document = Some(ManifestParser::parse_string(REPOSITORY).unwrap());

        let blocks = orchestrator.render_source(&source);
        assert!(blocks.contains(&" - Android SDK Tools, revision 24.4.1".to_string()));
    }
}
