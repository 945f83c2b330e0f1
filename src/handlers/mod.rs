// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) -> Protected (JWT + stored user) -> Elevated (JWT + role set)
//
// Handlers parse the request, call one service and wrap the result in
// `ApiResponse`. Route wiring lives in `crate::app`.

pub mod elevated; // Tier 3: admin / superadmin roles (/api/admin/*, /api/stats, ...)
pub mod protected; // Tier 2: any authenticated role (/api/*)
pub mod public; // Tier 1: no authentication (/, /health, /api/auth/login|register)
pub mod utils;
