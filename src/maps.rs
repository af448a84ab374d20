//! Shareable driving-directions links.

use crate::solver::RouteStop;

const GOOGLE_MAPS_DIR_URL: &str = "https://www.google.com/maps/dir";

/// Multi-stop Google Maps directions URL: start first, then each stop's
/// address in visiting order. Stops with a blank address are left out.
pub fn google_maps_url(start_address: &str, stops: &[RouteStop]) -> String {
    let addresses = stops
        .iter()
        .map(|stop| stop.lead.address.as_str())
        .filter(|address| !address.trim().is_empty());

    directions_url(std::iter::once(start_address).chain(addresses))
}

/// `.../dir/<addr1>/<addr2>/...` with every address percent-encoded.
pub fn directions_url<'a>(addresses: impl IntoIterator<Item = &'a str>) -> String {
    let mut url = String::from(GOOGLE_MAPS_DIR_URL);
    for address in addresses {
        url.push('/');
        url.push_str(&urlencoding::encode(address));
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::Lead;

    fn stop(order: usize, address: &str) -> RouteStop {
        RouteStop {
            lead: Lead::new(order.to_string(), format!("Stop {order}"), address),
            route_order: order,
            distance_from_previous: 1.0,
        }
    }

    #[test]
    fn test_url_lists_start_then_stops() {
        let stops = vec![
            stop(1, "100 Main St, Savannah, GA 31401"),
            stop(2, "619 Bluff Dr. Woodstock GA 30188"),
        ];
        let url = google_maps_url("1 Start Way, Atlanta, GA", &stops);

        assert_eq!(
            url,
            "https://www.google.com/maps/dir/\
             1%20Start%20Way%2C%20Atlanta%2C%20GA/\
             100%20Main%20St%2C%20Savannah%2C%20GA%2031401/\
             619%20Bluff%20Dr.%20Woodstock%20GA%2030188"
        );
    }

    #[test]
    fn test_url_escapes_slashes_and_skips_blank() {
        let stops = vec![stop(1, ""), stop(2, "12 A/B Street")];
        let url = google_maps_url("Home", &stops);
        assert_eq!(url, "https://www.google.com/maps/dir/Home/12%20A%2FB%20Street");
    }

    #[test]
    fn test_url_with_no_stops() {
        assert_eq!(google_maps_url("Home", &[]), "https://www.google.com/maps/dir/Home");
    }
}
