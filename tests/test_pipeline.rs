use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use itinera::agent::SearchAgent;
use itinera::api::{self, PlanEvent};
use itinera::async_trait;
use itinera::chat::{ChatMessage, ChatProvider, ChatResponse, FunctionCall, Tool, ToolCall};
use itinera::config::PlannerConfig;
use itinera::embedding::EmbeddingProvider;
use itinera::error::PlannerError;
use itinera::fetcher::DocumentFetcher;
use itinera::pipeline::TravelPlanner;
use itinera::retriever::DocumentRetriever;
use itinera::splitter::RecursiveHtmlSplitter;
use itinera::synthesizer::PlanSynthesizer;
use itinera::tools::ToolExecutor;
use itinera::vector_store::InMemoryVectorStore;

// ---- stubbed collaborators ------------------------------------------------

#[derive(Debug)]
struct StubResponse {
    text: Option<String>,
    tool_calls: Option<Vec<ToolCall>>,
}

impl std::fmt::Display for StubResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text.as_deref().unwrap_or(""))
    }
}

impl ChatResponse for StubResponse {
    fn text(&self) -> Option<String> {
        self.text.clone()
    }

    fn tool_calls(&self) -> Option<Vec<ToolCall>> {
        self.tool_calls.clone()
    }
}

#[derive(Clone)]
enum StubTurn {
    Text(String),
    Tools(Vec<ToolCall>),
}

/// Chat provider that replays a script of turns. A looping stub repeats its
/// last turn forever; a scripted one errors when exhausted so a test that
/// over-consumes fails loudly.
struct StubChat {
    turns: Mutex<VecDeque<StubTurn>>,
    repeat_last: bool,
    calls: AtomicUsize,
}

impl StubChat {
    fn scripted(turns: Vec<StubTurn>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            repeat_last: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn looping(turn: StubTurn) -> Self {
        Self {
            turns: Mutex::new(VecDeque::from([turn])),
            repeat_last: true,
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for StubChat {
    async fn chat_with_tools(
        &self,
        _messages: &[ChatMessage],
        _tools: Option<&[Tool]>,
    ) -> Result<Box<dyn ChatResponse>, PlannerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut turns = self.turns.lock().unwrap();
        let turn = if self.repeat_last {
            turns.front().cloned()
        } else {
            turns.pop_front()
        };
        match turn {
            Some(StubTurn::Text(text)) => Ok(Box::new(StubResponse {
                text: Some(text),
                tool_calls: None,
            })),
            Some(StubTurn::Tools(calls)) => Ok(Box::new(StubResponse {
                text: None,
                tool_calls: Some(calls),
            })),
            None => Err(PlannerError::Generic("stub chat script exhausted".into())),
        }
    }
}

/// Embedder that maps texts to vectors by keyword, with a fallback.
struct StubEmbedder {
    rules: Vec<(&'static str, Vec<f32>)>,
    default: Vec<f32>,
}

impl StubEmbedder {
    fn uniform() -> Self {
        Self {
            rules: Vec::new(),
            default: vec![1.0, 0.0],
        }
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, input: Vec<String>) -> Result<Vec<Vec<f32>>, PlannerError> {
        Ok(input
            .iter()
            .map(|text| {
                self.rules
                    .iter()
                    .find(|(keyword, _)| text.contains(keyword))
                    .map(|(_, v)| v.clone())
                    .unwrap_or_else(|| self.default.clone())
            })
            .collect())
    }
}

struct StubFetcher {
    html: String,
}

#[async_trait]
impl DocumentFetcher for StubFetcher {
    async fn fetch(&self, _url: &str, _selector: &str) -> Result<String, PlannerError> {
        Ok(self.html.clone())
    }
}

struct FailingFetcher;

#[async_trait]
impl DocumentFetcher for FailingFetcher {
    async fn fetch(&self, url: &str, _selector: &str) -> Result<String, PlannerError> {
        Err(PlannerError::FetchError(format!("{url} unreachable")))
    }
}

/// Tool that records invocations and returns a fixed observation.
struct RecordingTool {
    name: &'static str,
    output: String,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ToolExecutor for RecordingTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        "stubbed tool"
    }

    async fn call(&self, _query: &str) -> Result<String, PlannerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

struct FailingTool;

#[async_trait]
impl ToolExecutor for FailingTool {
    fn name(&self) -> &str {
        "stub_broken"
    }

    fn description(&self) -> &str {
        "always fails"
    }

    async fn call(&self, _query: &str) -> Result<String, PlannerError> {
        Err(PlannerError::ToolError("upstream timeout".into()))
    }
}

fn tool_call(id: &str, name: &str, query: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        call_type: "function".to_string(),
        function: FunctionCall {
            name: name.to_string(),
            arguments: format!(r#"{{"query": "{query}"}}"#),
        },
    }
}

fn stub_retriever(
    fetcher: Arc<dyn DocumentFetcher>,
    embedder: Arc<dyn EmbeddingProvider>,
    chunk_size: usize,
) -> DocumentRetriever {
    DocumentRetriever::new(
        fetcher,
        embedder,
        Arc::new(InMemoryVectorStore::new()),
        RecursiveHtmlSplitter::new(chunk_size, 0),
        "trips",
    )
}

// ---- search agent ---------------------------------------------------------

#[tokio::test]
async fn agent_output_references_stubbed_sources() {
    let search_calls = Arc::new(AtomicUsize::new(0));
    let lookup_calls = Arc::new(AtomicUsize::new(0));
    let tools: Vec<Box<dyn ToolExecutor>> = vec![
        Box::new(RecordingTool {
            name: "stub_search",
            output: "snippet: summer festival on the Seine".to_string(),
            calls: search_calls.clone(),
        }),
        Box::new(RecordingTool {
            name: "stub_lookup",
            output: "Paris is the capital of France.\n\nJune in Paris is warm.".to_string(),
            calls: lookup_calls.clone(),
        }),
    ];
    let chat = StubChat::scripted(vec![
        StubTurn::Tools(vec![
            tool_call("call-1", "stub_search", "Paris events June 2025"),
            tool_call("call-2", "stub_lookup", "Paris"),
        ]),
        StubTurn::Text(
            "Research summary: there is a summer festival on the Seine in June 2025.".to_string(),
        ),
    ]);

    let agent = SearchAgent::new(Arc::new(chat), tools, 5);
    let output = agent.run("Plan a trip to Paris in June 2025").await.unwrap();

    assert!(output.contains("summer festival on the Seine"));
    assert_eq!(search_calls.load(Ordering::SeqCst), 1);
    assert_eq!(lookup_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn agent_absorbs_tool_failures_as_observations() {
    let chat = StubChat::scripted(vec![
        StubTurn::Tools(vec![tool_call("call-1", "stub_broken", "anything")]),
        StubTurn::Text("best effort answer".to_string()),
    ]);
    let agent = SearchAgent::new(Arc::new(chat), vec![Box::new(FailingTool)], 5);

    let output = agent.run("trip request").await.unwrap();
    assert_eq!(output, "best effort answer");
}

#[tokio::test]
async fn agent_treats_unknown_tool_as_observation() {
    let chat = StubChat::scripted(vec![
        StubTurn::Tools(vec![tool_call("call-1", "no_such_tool", "x")]),
        StubTurn::Text("answered anyway".to_string()),
    ]);
    let agent = SearchAgent::new(Arc::new(chat), vec![Box::new(FailingTool)], 5);

    let output = agent.run("trip request").await.unwrap();
    assert_eq!(output, "answered anyway");
}

#[tokio::test]
async fn agent_terminates_within_step_budget() {
    let calls = Arc::new(AtomicUsize::new(0));
    let chat = Arc::new(StubChat::looping(StubTurn::Tools(vec![tool_call(
        "call-1",
        "stub_search",
        "more results",
    )])));
    let tools: Vec<Box<dyn ToolExecutor>> = vec![Box::new(RecordingTool {
        name: "stub_search",
        output: "the same snippet again".to_string(),
        calls: calls.clone(),
    })];

    let agent = SearchAgent::new(chat.clone(), tools, 3);
    let output = agent.run("loop forever please").await.unwrap();

    // Best-effort partial answer, not an error, and no extra model turns.
    assert!(output.contains("the same snippet again"));
    assert_eq!(chat.call_count(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn agent_returns_immediate_final_answer() {
    let chat = Arc::new(StubChat::scripted(vec![StubTurn::Text(
        "no tools needed".to_string(),
    )]));
    let agent = SearchAgent::new(chat.clone(), vec![], 5);

    let output = agent.run("easy question").await.unwrap();
    assert_eq!(output, "no tools needed");
    assert_eq!(chat.call_count(), 1);
}

// ---- document retriever ---------------------------------------------------

const THREE_PARAGRAPHS: &str = "<p>alpha: the Louvre opens early for visitors.</p>\
     <p>beta: the Eiffel Tower sparkles at night.</p>\
     <p>gamma: day trip to the Giverny gardens.</p>";

#[tokio::test]
async fn retriever_returns_the_two_nearest_of_three_chunks() {
    let embedder = Arc::new(StubEmbedder {
        rules: vec![
            ("alpha", vec![1.0, 0.0]),
            ("beta", vec![0.8, 0.2]),
            ("gamma", vec![0.0, 1.0]),
        ],
        default: vec![1.0, 0.0],
    });
    let fetcher = Arc::new(StubFetcher {
        html: THREE_PARAGRAPHS.to_string(),
    });
    let retriever = stub_retriever(fetcher, embedder, 60);

    let index = retriever
        .build_index("https://example.org/guide", "#content")
        .await
        .unwrap();
    assert_eq!(index.size, 3);

    let chunks = retriever.query(&index, "alpha", 2).await.unwrap();
    assert_eq!(chunks.len(), 2);
    assert!(chunks[0].text.contains("alpha"));
    assert!(chunks[1].text.contains("beta"));
}

#[tokio::test]
async fn retriever_never_returns_more_than_top_k() {
    let fetcher = Arc::new(StubFetcher {
        html: THREE_PARAGRAPHS.to_string(),
    });
    let retriever = stub_retriever(fetcher, Arc::new(StubEmbedder::uniform()), 60);

    let index = retriever.build_index("src", "#c").await.unwrap();
    let chunks = retriever.query(&index, "anything", 10).await.unwrap();
    assert_eq!(chunks.len(), 3);

    let chunks = retriever.query(&index, "anything", 1).await.unwrap();
    assert_eq!(chunks.len(), 1);
}

#[tokio::test]
async fn consecutive_runs_are_indexed_in_isolation() {
    let fetcher = Arc::new(StubFetcher {
        html: String::new(),
    });
    let retriever = stub_retriever(fetcher, Arc::new(StubEmbedder::uniform()), 200);

    let first = retriever
        .build_index_from_html("run-one", "<p>run one: canal tour timetable.</p>")
        .await
        .unwrap();
    let second = retriever
        .build_index_from_html("run-two", "<p>run two: castle opening hours.</p>")
        .await
        .unwrap();
    assert_ne!(first.collection, second.collection);

    // The second index only ever sees its own run's chunks.
    let chunks = retriever.query(&second, "anything", 10).await.unwrap();
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].text.contains("run two"));

    let chunks = retriever.query(&first, "anything", 10).await.unwrap();
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].text.contains("run one"));
}

#[tokio::test]
async fn dropped_index_is_no_longer_queryable() {
    let fetcher = Arc::new(StubFetcher {
        html: THREE_PARAGRAPHS.to_string(),
    });
    let retriever = stub_retriever(fetcher, Arc::new(StubEmbedder::uniform()), 200);

    let index = retriever.build_index("src", "#c").await.unwrap();
    retriever.drop_index(&index).await.unwrap();

    let err = retriever.query(&index, "anything", 1).await.unwrap_err();
    assert!(matches!(err, PlannerError::IndexError(_)));
}

#[tokio::test]
async fn embedding_failures_are_fatal_for_the_run() {
    struct BrokenEmbedder;

    #[async_trait]
    impl EmbeddingProvider for BrokenEmbedder {
        async fn embed(&self, _input: Vec<String>) -> Result<Vec<Vec<f32>>, PlannerError> {
            Err(PlannerError::EmbeddingError("quota exceeded".into()))
        }
    }

    let fetcher = Arc::new(StubFetcher {
        html: THREE_PARAGRAPHS.to_string(),
    });
    let retriever = stub_retriever(fetcher, Arc::new(BrokenEmbedder), 60);

    let err = retriever.build_index("src", "#c").await.unwrap_err();
    assert!(matches!(err, PlannerError::EmbeddingError(_)));
}

// ---- entry-point adapter --------------------------------------------------

fn stub_planner(synth_output: &str) -> TravelPlanner {
    let agent_chat = StubChat::scripted(vec![StubTurn::Text("research: stub notes".to_string())]);
    let agent = SearchAgent::new(Arc::new(agent_chat), vec![], 3);

    let fetcher = Arc::new(StubFetcher {
        html: THREE_PARAGRAPHS.to_string(),
    });
    let retriever = stub_retriever(fetcher, Arc::new(StubEmbedder::uniform()), 200);

    let synth_chat = StubChat::scripted(vec![StubTurn::Text(synth_output.to_string())]);
    let synthesizer = PlanSynthesizer::new(Arc::new(synth_chat));

    TravelPlanner::new(agent, retriever, synthesizer, PlannerConfig::new("test-key"))
}

#[tokio::test]
async fn adapter_wraps_the_itinerary_as_a_200_response() {
    let planner = stub_planner("STUB ITINERARY");

    let response = api::handle(
        &planner,
        PlanEvent {
            input: "X".to_string(),
        },
    )
    .await
    .unwrap();

    assert_eq!(response.status_code, 200);
    assert_eq!(response.body.message, "STUB ITINERARY");
    assert_eq!(
        response.headers.get("Content-Type").map(String::as_str),
        Some("application/json")
    );
}

#[tokio::test]
async fn one_planner_serves_consecutive_requests() {
    let agent_chat = StubChat::looping(StubTurn::Text("research notes".to_string()));
    let agent = SearchAgent::new(Arc::new(agent_chat), vec![], 3);
    let fetcher = Arc::new(StubFetcher {
        html: THREE_PARAGRAPHS.to_string(),
    });
    let retriever = stub_retriever(fetcher, Arc::new(StubEmbedder::uniform()), 200);
    let synth_chat = StubChat::looping(StubTurn::Text("STUB PLAN".to_string()));
    let planner = TravelPlanner::new(
        agent,
        retriever,
        PlanSynthesizer::new(Arc::new(synth_chat)),
        PlannerConfig::new("test-key"),
    );

    assert_eq!(planner.plan("trip one").await.unwrap(), "STUB PLAN");
    assert_eq!(planner.plan("trip two").await.unwrap(), "STUB PLAN");
}

#[tokio::test]
async fn adapter_propagates_pipeline_failures() {
    let agent_chat = StubChat::scripted(vec![StubTurn::Text("notes".to_string())]);
    let agent = SearchAgent::new(Arc::new(agent_chat), vec![], 3);
    let retriever = stub_retriever(Arc::new(FailingFetcher), Arc::new(StubEmbedder::uniform()), 200);
    let synth_chat = StubChat::scripted(vec![]);
    let planner = TravelPlanner::new(
        agent,
        retriever,
        PlanSynthesizer::new(Arc::new(synth_chat)),
        PlannerConfig::new("test-key"),
    );

    let err = api::handle(
        &planner,
        PlanEvent {
            input: "X".to_string(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, PlannerError::FetchError(_)));
}

// ---- synthesizer prompt ---------------------------------------------------

#[tokio::test]
async fn synthesizer_returns_model_text_verbatim() {
    let chat = StubChat::scripted(vec![StubTurn::Text("Day 1: arrive and rest.".to_string())]);
    let synthesizer = PlanSynthesizer::new(Arc::new(chat));

    let output = synthesizer
        .synthesize("Paris in June", "festival notes", &[])
        .await
        .unwrap();
    assert_eq!(output, "Day 1: arrive and rest.");
}

#[tokio::test]
async fn model_failures_during_synthesis_propagate() {
    let chat = StubChat::scripted(vec![]);
    let synthesizer = PlanSynthesizer::new(Arc::new(chat));

    let err = synthesizer
        .synthesize("Paris", "notes", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::ModelCallError(_)));
}
