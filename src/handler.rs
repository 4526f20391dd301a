use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, error, info};
use transit_router_core::prelude::*;

use crate::requests::{BaseRequest, StatKind, StatRequest};

const NOT_FOUND: &str = "not found";
const UNKNOWN_STOP: &str = "unknown stop";
const UNSUPPORTED: &str = "unsupported request";
const INTERNAL_ERROR: &str = "internal error";

/// Fills a catalogue from base requests.
///
/// Stops go in first so buses and road distances may refer to stops listed
/// after them.
///
/// # Errors
///
/// Returns an error on duplicate names, unknown stops or invalid distances
pub fn build_catalogue(requests: &[BaseRequest]) -> Result<Catalogue, Error> {
    let mut catalogue = Catalogue::new();

    for request in requests {
        if let BaseRequest::Stop {
            name,
            latitude,
            longitude,
            ..
        } = request
        {
            catalogue.add_stop(name.as_str(), Coordinates::new(*latitude, *longitude))?;
        }
    }

    for request in requests {
        if let BaseRequest::Bus {
            name,
            stops,
            is_roundtrip,
        } = request
        {
            catalogue.add_bus(name.as_str(), stops.as_slice(), *is_roundtrip)?;
        }
    }

    for request in requests {
        if let BaseRequest::Stop {
            name,
            road_distances,
            ..
        } = request
        {
            for (to, &metres) in road_distances {
                catalogue.set_distance(name, to, metres)?;
            }
        }
    }

    info!(
        "Catalogue holds {} stops and {} buses",
        catalogue.stop_count(),
        catalogue.bus_count()
    );
    Ok(catalogue)
}

/// Answer to a single stat request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Bus {
        request_id: i64,
        #[serde(flatten)]
        stats: BusStats,
    },
    Stop {
        request_id: i64,
        buses: Vec<String>,
    },
    Route {
        request_id: i64,
        total_time: Minutes,
        items: Vec<RouteItem>,
    },
    Error {
        request_id: i64,
        error_message: &'static str,
    },
}

impl Response {
    pub fn request_id(&self) -> i64 {
        match self {
            Response::Bus { request_id, .. }
            | Response::Stop { request_id, .. }
            | Response::Route { request_id, .. }
            | Response::Error { request_id, .. } => *request_id,
        }
    }

    fn error(request_id: i64, error_message: &'static str) -> Self {
        Response::Error {
            request_id,
            error_message,
        }
    }
}

/// Answers stat requests from a catalogue and its routing engine
pub struct RequestHandler<'a> {
    catalogue: &'a Catalogue,
    engine: &'a RoutingEngine,
}

impl<'a> RequestHandler<'a> {
    pub fn new(catalogue: &'a Catalogue, engine: &'a RoutingEngine) -> Self {
        Self { catalogue, engine }
    }

    pub fn handle(&self, request: &StatRequest) -> Response {
        let id = request.id;
        match &request.kind {
            StatKind::Bus { name } => match self.catalogue.bus_stats(name) {
                Some(stats) => Response::Bus {
                    request_id: id,
                    stats,
                },
                None => Response::error(id, NOT_FOUND),
            },
            StatKind::Stop { name } => match self.catalogue.buses_for_stop(name) {
                Some(buses) => Response::Stop {
                    request_id: id,
                    buses: buses.into_iter().map(str::to_string).collect(),
                },
                None => Response::error(id, NOT_FOUND),
            },
            StatKind::Route { from, to } => route_response(id, self.engine.query(from, to)),
            StatKind::Unsupported => Response::error(id, UNSUPPORTED),
        }
    }

    /// Answers all requests in parallel, keeping their order
    pub fn handle_all(&self, requests: &[StatRequest]) -> Vec<Response> {
        requests
            .par_iter()
            .map(|request| self.handle(request))
            .collect()
    }
}

fn route_response(id: i64, result: Result<Option<Route>, Error>) -> Response {
    match result {
        Ok(Some(route)) => Response::Route {
            request_id: id,
            total_time: route.total_time,
            items: route.items,
        },
        Ok(None) => Response::error(id, NOT_FOUND),
        Err(Error::UnknownStop(name)) => {
            debug!("Request {id} names unknown stop '{name}'");
            Response::error(id, UNKNOWN_STOP)
        }
        Err(e) => {
            error!("Request {id} failed: {e}");
            Response::error(id, INTERNAL_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn stop(name: &str, latitude: f64, distances: &[(&str, f64)]) -> BaseRequest {
        BaseRequest::Stop {
            name: name.to_string(),
            latitude,
            longitude: 37.2,
            road_distances: distances
                .iter()
                .map(|&(to, metres)| (to.to_string(), metres))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn bus(name: &str, stops: &[&str], is_roundtrip: bool) -> BaseRequest {
        BaseRequest::Bus {
            name: name.to_string(),
            stops: stops.iter().map(|stop| stop.to_string()).collect(),
            is_roundtrip,
        }
    }

    fn request(id: i64, kind: StatKind) -> StatRequest {
        StatRequest { id, kind }
    }

    /// Bus listed before its stops, and a distance to a stop listed later
    fn base_requests() -> Vec<BaseRequest> {
        vec![
            bus("14", &["A", "B", "C"], false),
            stop("A", 55.60, &[("B", 3900.0)]),
            stop("B", 55.61, &[("C", 9900.0)]),
            stop("C", 55.62, &[]),
            stop("D", 55.63, &[]),
            bus("2", &["C", "B"], false),
        ]
    }

    fn handler_fixture() -> (Catalogue, RoutingEngine) {
        let catalogue = build_catalogue(&base_requests()).unwrap();
        let engine = RoutingEngine::build(&catalogue, RoutingSettings::new(6, 40.0)).unwrap();
        (catalogue, engine)
    }

    #[test]
    fn base_requests_apply_stops_first() {
        let catalogue = build_catalogue(&base_requests()).unwrap();
        assert_eq!(catalogue.stop_count(), 4);
        assert_eq!(catalogue.bus_count(), 2);
        let a = catalogue.stop_id("A").unwrap();
        let b = catalogue.stop_id("B").unwrap();
        assert_eq!(catalogue.distance(a, b), 3900.0);
    }

    #[test]
    fn bus_through_missing_stop_is_rejected() {
        let requests = vec![stop("A", 55.6, &[]), bus("14", &["A", "Z"], false)];
        assert!(matches!(
            build_catalogue(&requests),
            Err(Error::UnknownStop(name)) if name == "Z"
        ));
    }

    #[test]
    fn answers_every_request_kind() {
        let (catalogue, engine) = handler_fixture();
        let handler = RequestHandler::new(&catalogue, &engine);

        match handler.handle(&request(1, StatKind::Bus { name: "14".into() })) {
            Response::Bus { request_id, stats } => {
                assert_eq!(request_id, 1);
                assert_eq!(stats.stop_count, 5);
                assert_eq!(stats.unique_stop_count, 3);
                assert_eq!(stats.route_length, 27600.0);
            }
            other => panic!("expected bus stats, got {other:?}"),
        }

        assert_eq!(
            handler.handle(&request(2, StatKind::Stop { name: "B".into() })),
            Response::Stop {
                request_id: 2,
                buses: vec!["14".to_string(), "2".to_string()],
            }
        );
        assert_eq!(
            handler.handle(&request(3, StatKind::Stop { name: "D".into() })),
            Response::Stop {
                request_id: 3,
                buses: Vec::new(),
            }
        );

        match handler.handle(&request(
            4,
            StatKind::Route {
                from: "A".into(),
                to: "C".into(),
            },
        )) {
            Response::Route {
                request_id,
                total_time,
                items,
            } => {
                assert_eq!(request_id, 4);
                assert!((total_time - (6.0 + 13800.0 / (40.0 * 1000.0 / 60.0))).abs() < 1e-9);
                assert_eq!(items.len(), 2);
            }
            other => panic!("expected a route, got {other:?}"),
        }
    }

    #[test]
    fn failures_are_answered_with_messages() {
        let (catalogue, engine) = handler_fixture();
        let handler = RequestHandler::new(&catalogue, &engine);

        let cases = [
            (StatKind::Bus { name: "999".into() }, NOT_FOUND),
            (StatKind::Stop { name: "Z".into() }, NOT_FOUND),
            (
                StatKind::Route {
                    from: "A".into(),
                    to: "D".into(),
                },
                NOT_FOUND,
            ),
            (
                StatKind::Route {
                    from: "A".into(),
                    to: "Z".into(),
                },
                UNKNOWN_STOP,
            ),
            (StatKind::Unsupported, UNSUPPORTED),
        ];
        for (id, (kind, message)) in cases.into_iter().enumerate() {
            let id = id as i64;
            assert_eq!(
                handler.handle(&request(id, kind)),
                Response::error(id, message)
            );
        }
    }

    #[test]
    fn other_query_errors_are_not_reported_as_missing_routes() {
        let response = route_response(5, Err(Error::CorruptState("broken table".into())));
        assert_eq!(response, Response::error(5, INTERNAL_ERROR));
        assert_ne!(response, Response::error(5, NOT_FOUND));

        assert_eq!(route_response(6, Ok(None)), Response::error(6, NOT_FOUND));
        assert_eq!(
            route_response(7, Err(Error::UnknownStop("Z".into()))),
            Response::error(7, UNKNOWN_STOP)
        );
    }

    #[test]
    fn parallel_answers_keep_request_order() {
        let (catalogue, engine) = handler_fixture();
        let handler = RequestHandler::new(&catalogue, &engine);

        let requests: Vec<_> = (0..64)
            .map(|id| {
                let kind = if id % 2 == 0 {
                    StatKind::Route {
                        from: "C".into(),
                        to: "A".into(),
                    }
                } else {
                    StatKind::Stop { name: "A".into() }
                };
                request(id, kind)
            })
            .collect();
        let responses = handler.handle_all(&requests);

        let ids: Vec<_> = responses.iter().map(Response::request_id).collect();
        assert_eq!(ids, (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn responses_serialize_flat() {
        let (catalogue, engine) = handler_fixture();
        let handler = RequestHandler::new(&catalogue, &engine);

        let value = serde_json::to_value(handler.handle(&request(
            7,
            StatKind::Route {
                from: "A".into(),
                to: "B".into(),
            },
        )))
        .unwrap();
        assert_eq!(value["request_id"], 7);
        assert_eq!(value["items"][0]["type"], "Wait");
        assert_eq!(value["items"][0]["stop_name"], "A");
        assert_eq!(value["items"][1]["type"], "Bus");
        assert_eq!(value["items"][1]["bus"], "14");
        assert_eq!(value["items"][1]["span_count"], 1);

        let value = serde_json::to_value(handler.handle(&request(
            8,
            StatKind::Bus { name: "14".into() },
        )))
        .unwrap();
        assert_eq!(value["stop_count"], 5);
        assert!(value.get("stats").is_none());

        let value = serde_json::to_value(Response::error(9, UNSUPPORTED)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "request_id": 9, "error_message": "unsupported request" })
        );
    }
}
