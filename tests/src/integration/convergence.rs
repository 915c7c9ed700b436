//! # Multi-Router Convergence
//!
//! Small topologies run to steady state over the in-process network:
//! discovery, table exchange, path costs, loop suppression, and recovery
//! after a link is cut.

#[cfg(test)]
mod tests {
    use super::super::network::SimNetwork;
    use ndvr_routing::Cost;

    const A: usize = 0;
    const B: usize = 1;
    const C: usize = 2;

    /// A - B - C
    fn line() -> SimNetwork {
        let mut net = SimNetwork::new(&["A", "B", "C"]);
        net.link(A, B);
        net.link(B, C);
        net
    }

    /// A - B - C with a direct A - C link.
    fn triangle() -> SimNetwork {
        let mut net = line();
        net.link(A, C);
        net
    }

    #[test]
    fn test_line_discovers_adjacent_routers_only() {
        let mut net = line();
        net.run_for(1);

        assert!(net.router(A).neighbors().contains(&net.router_prefix(B)));
        assert!(!net.router(A).neighbors().contains(&net.router_prefix(C)));
        assert_eq!(net.router(B).neighbors().len(), 2);
    }

    #[test]
    fn test_line_converges_to_hop_counts() {
        let mut net = line();
        net.run_for(15);

        assert_eq!(net.route(A, "/net/b"), Some((B, Cost::new(1))));
        assert_eq!(net.route(A, "/net/c"), Some((B, Cost::new(2))));
        assert_eq!(net.route(B, "/net/a"), Some((A, Cost::new(1))));
        assert_eq!(net.route(B, "/net/c"), Some((C, Cost::new(1))));
        assert_eq!(net.route(C, "/net/a"), Some((B, Cost::new(2))));

        for router in [A, B, C] {
            assert_eq!(net.table(router).len(), 3, "router {}", net.name(router));
        }
    }

    #[test]
    fn test_line_never_routes_back_through_origin() {
        let mut net = line();
        net.run_for(15);

        // B advertises /net/a through A; A must not hold a path via B.
        let entry = net.table(A).get("/net/a").unwrap();
        assert_eq!(entry.next_hop_count(), 1);
        assert_eq!(entry.originator(), net.router_prefix(A));

        // C's path to A carries both routers in its digest.
        let hop = net
            .table(C)
            .get("/net/a")
            .and_then(|entry| entry.selected_next_hop())
            .unwrap();
        assert!(hop.path_digest.contains(net.router_prefix(A)));
        assert!(hop.path_digest.contains(net.router_prefix(B)));
    }

    #[test]
    fn test_steady_state_is_stable() {
        let mut net = line();
        net.run_for(15);
        let before: Vec<_> = [A, B, C]
            .iter()
            .map(|&router| net.router(router).fib_entries())
            .collect();

        net.run_for(20);
        let after: Vec<_> = [A, B, C]
            .iter()
            .map(|&router| net.router(router).fib_entries())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_cut_link_withdraws_routes_downstream() {
        let mut net = line();
        net.run_for(15);
        assert!(net.route(A, "/net/c").is_some());

        net.cut(B, C);
        net.run_for(20);

        assert_eq!(net.route(B, "/net/c"), None);
        assert_eq!(net.route(A, "/net/c"), None);
        assert_eq!(net.route(A, "/net/b"), Some((B, Cost::new(1))));
        assert!(net
            .router(B)
            .neighbors()
            .get(&net.router_prefix(C))
            .map_or(true, |neighbor| neighbor.is_stale()));
    }

    #[test]
    fn test_triangle_prefers_direct_link() {
        let mut net = triangle();
        net.run_for(15);

        assert_eq!(net.route(A, "/net/c"), Some((C, Cost::new(1))));
        // The two-hop path is kept as an alternative.
        let entry = net.table(A).get("/net/c").unwrap();
        assert_eq!(
            entry.next_hop(&net.router_prefix(B)).map(|hop| hop.cost),
            Some(Cost::new(2))
        );
    }

    #[test]
    fn test_triangle_fails_over_to_longer_path() {
        let mut net = triangle();
        net.run_for(15);

        net.cut(A, C);
        net.run_for(20);

        assert_eq!(net.route(A, "/net/c"), Some((B, Cost::new(2))));
        assert_eq!(net.route(C, "/net/a"), Some((B, Cost::new(2))));
    }

    #[test]
    fn test_restored_link_is_used_again() {
        let mut net = triangle();
        net.run_for(15);
        net.cut(A, C);
        net.run_for(20);

        net.link(A, C);
        // Hellos have backed off; wait out the longest interval.
        net.run_for(20);

        assert_eq!(net.route(A, "/net/c"), Some((C, Cost::new(1))));
    }
}
