use tradescope::feed::{read_events, Replayer};

const EVENTS: &str = r#"{"type":"bar","instrument":"A","time_ms":0,"close":100}
{"type":"bar","instrument":"B","time_ms":0,"high":51,"low":49,"close":50}
{"type":"valuation","time_ms":0,"value":5000,"cash":5000}
{"type":"trade","trade_ref":2,"instrument":"B","fill":{"price":50,"signed_quantity":-20,"commission":0.5,"executed_at":0},"snapshot":{"net_size":-20,"average_cost":50,"bar_length":0,"observed_at":0}}
{"type":"trade","trade_ref":1,"instrument":"A","fill":{"price":100,"signed_quantity":5,"commission":0.5,"executed_at":0},"snapshot":{"net_size":5,"average_cost":100,"bar_length":0,"observed_at":0}}
{"type":"step","time_ms":0,"positions":[{"instrument":"A","size":5},{"instrument":"B","size":-20}]}
{"type":"bar","instrument":"A","time_ms":60000,"close":104}
{"type":"bar","instrument":"B","time_ms":60000,"high":50,"low":45,"close":46}
{"type":"valuation","time_ms":60000,"value":5100,"cash":5000}
{"type":"trade","trade_ref":2,"instrument":"B","fill":{"price":46,"signed_quantity":20,"commission":0.5,"executed_at":60000},"snapshot":{"net_size":0,"average_cost":50,"bar_length":1,"observed_at":60000},"closed":true}
{"type":"trade","trade_ref":1,"instrument":"A","fill":{"price":104,"signed_quantity":-2,"commission":0.5,"executed_at":60000},"snapshot":{"net_size":3,"average_cost":100,"bar_length":1,"observed_at":60000}}
{"type":"step","time_ms":60000,"positions":[{"instrument":"A","size":3},{"instrument":"B","size":0}]}
"#;

fn run_once() -> Replayer {
    let events = read_events(EVENTS.as_bytes()).unwrap();
    let mut replayer = Replayer::new();
    replayer.run(&events).unwrap();
    replayer
}

#[test]
fn test_get_analysis_is_repeatable() {
    let replayer = run_once();

    let first = replayer.trade_analyzer().get_analysis();
    let second = replayer.trade_analyzer().get_analysis();
    assert_eq!(first, second);

    let first = replayer.portfolio_analyzer().get_analysis();
    let second = replayer.portfolio_analyzer().get_analysis();
    assert_eq!(first, second);
}

#[test]
fn test_separate_runs_produce_identical_json() {
    let a = run_once();
    let b = run_once();

    let trades_a = serde_json::to_string(&a.trade_analyzer().get_analysis()).unwrap();
    let trades_b = serde_json::to_string(&b.trade_analyzer().get_analysis()).unwrap();
    assert_eq!(trades_a, trades_b);

    let portfolio_a = serde_json::to_string(&a.portfolio_analyzer().get_analysis()).unwrap();
    let portfolio_b = serde_json::to_string(&b.portfolio_analyzer().get_analysis()).unwrap();
    assert_eq!(portfolio_a, portfolio_b);
}

#[test]
fn test_same_timestamp_legs_keep_processing_order() {
    let replayer = run_once();
    let table = replayer.trade_analyzer().get_analysis();

    let instruments: Vec<String> = table
        .column("instrument")
        .unwrap()
        .into_iter()
        .map(|c| c.render())
        .collect();
    assert_eq!(instruments, vec!["B", "A", "B", "A"]);

    let actions: Vec<String> = table
        .column("action")
        .unwrap()
        .into_iter()
        .map(|c| c.render())
        .collect();
    assert_eq!(
        actions,
        vec!["open short", "open long", "close short", "close long"]
    );
}
