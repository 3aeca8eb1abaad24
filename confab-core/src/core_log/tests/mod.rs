/*
    Integration tests for the core_log subsystem

    Test suite covering:
    - Replica convergence under merge (commutative, associative, idempotent)
    - Canonical ordering and tie-breaks
    - Delta queries via since
    - Edge cases around empty logs and key collisions
*/

pub mod convergence_tests;
pub mod log_edge_cases;
