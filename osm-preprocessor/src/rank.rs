use crate::distance::haversine_m;
use common::Street;

/// Length in metres of the path through the street's nodes, first to last.
pub fn street_length(street: &Street) -> f64 {
    street
        .nodes
        .windows(2)
        .map(|nodes| {
            let [n1, n2] = nodes else { unreachable!() };
            haversine_m(n1.coordinate(), n2.coordinate())
        })
        .sum()
}

/// Longest street first. Streets of equal length keep their relative order.
pub fn rank_by_length(streets: Vec<Street>) -> Vec<Street> {
    let mut ranked: Vec<(f64, Street)> = streets
        .into_iter()
        .map(|street| (street_length(&street), street))
        .collect();

    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.into_iter().map(|(_, street)| street).collect()
}
