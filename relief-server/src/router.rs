//! Path and method resolution for the REST surface.
//!
//! Paths are split into segments and matched as slices, so `/api/campaigns/`
//! and `/api/campaigns` resolve the same way. The method is checked before
//! any id is parsed: `DELETE /api/campaigns/abc` is a 405, not a 400.

use hyper::Method;

/// Every endpoint the server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Health,
    ListCampaigns,
    CreateCampaign,
    GetCampaign(u64),
    ListDonations(u64),
    Donate(u64),
    ListProofs(u64),
    UploadProof(u64),
    UpdateProof(u64),
    Login,
    Profile,
    QuickDonate,
    EscrowStatus,
    EscrowApprove,
    EscrowRelease,
    Stats,
    AssessRisk,
    AssessImpact,
    AssessSupplies,
    AssessAllocate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No endpoint lives at this path.
    NotFound,
    /// The path exists; the value lists its methods for the `Allow` header.
    MethodNotAllowed(String),
    /// An `:id` segment is not a non-negative integer.
    BadId(String),
}

fn allow(method: &Method, allowed: &[Method]) -> Result<(), RouteError> {
    if allowed.contains(method) {
        Ok(())
    } else {
        let list: Vec<&str> = allowed.iter().map(Method::as_str).collect();
        Err(RouteError::MethodNotAllowed(list.join(", ")))
    }
}

fn parse_id(segment: &str) -> Result<u64, RouteError> {
    segment
        .parse()
        .map_err(|_| RouteError::BadId(segment.to_string()))
}

/// Resolve a request line to a [`Route`].
pub fn resolve(method: &Method, path: &str) -> Result<Route, RouteError> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [] => {
            allow(method, &[Method::GET])?;
            Ok(Route::Health)
        }
        ["api", "campaigns"] => {
            allow(method, &[Method::GET, Method::POST])?;
            Ok(if *method == Method::POST {
                Route::CreateCampaign
            } else {
                Route::ListCampaigns
            })
        }
        ["api", "campaigns", id] => {
            allow(method, &[Method::GET])?;
            Ok(Route::GetCampaign(parse_id(id)?))
        }
        ["api", "campaigns", id, "donations"] => {
            allow(method, &[Method::GET])?;
            Ok(Route::ListDonations(parse_id(id)?))
        }
        ["api", "campaigns", id, "donate"] => {
            allow(method, &[Method::POST])?;
            Ok(Route::Donate(parse_id(id)?))
        }
        ["api", "campaigns", id, "proofs"] => {
            allow(method, &[Method::GET, Method::POST])?;
            let id = parse_id(id)?;
            Ok(if *method == Method::POST {
                Route::UploadProof(id)
            } else {
                Route::ListProofs(id)
            })
        }
        ["api", "proofs", id] => {
            allow(method, &[Method::PATCH])?;
            Ok(Route::UpdateProof(parse_id(id)?))
        }
        ["api", "auth", "login"] => {
            allow(method, &[Method::POST])?;
            Ok(Route::Login)
        }
        ["api", "users", "profile"] => {
            allow(method, &[Method::GET])?;
            Ok(Route::Profile)
        }
        ["api", "donate"] => {
            allow(method, &[Method::POST])?;
            Ok(Route::QuickDonate)
        }
        ["api", "escrow-status"] => {
            allow(method, &[Method::GET])?;
            Ok(Route::EscrowStatus)
        }
        ["api", "escrow", action] => {
            let route = match *action {
                "approve" => Route::EscrowApprove,
                "release" => Route::EscrowRelease,
                _ => return Err(RouteError::NotFound),
            };
            allow(method, &[Method::POST])?;
            Ok(route)
        }
        ["api", "stats"] => {
            allow(method, &[Method::GET])?;
            Ok(Route::Stats)
        }
        ["api", "assess", kind] => {
            let route = match *kind {
                "risk" => Route::AssessRisk,
                "impact" => Route::AssessImpact,
                "supplies" => Route::AssessSupplies,
                "allocate" => Route::AssessAllocate,
                _ => return Err(RouteError::NotFound),
            };
            allow(method, &[Method::POST])?;
            Ok(route)
        }
        _ => Err(RouteError::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_campaign_routes() {
        assert_eq!(resolve(&Method::GET, "/"), Ok(Route::Health));
        assert_eq!(resolve(&Method::GET, "/api/campaigns"), Ok(Route::ListCampaigns));
        assert_eq!(resolve(&Method::GET, "/api/campaigns/"), Ok(Route::ListCampaigns));
        assert_eq!(resolve(&Method::POST, "/api/campaigns"), Ok(Route::CreateCampaign));
        assert_eq!(resolve(&Method::GET, "/api/campaigns/12"), Ok(Route::GetCampaign(12)));
        assert_eq!(resolve(&Method::POST, "/api/campaigns/3/donate"), Ok(Route::Donate(3)));
        assert_eq!(resolve(&Method::GET, "/api/campaigns/3/proofs"), Ok(Route::ListProofs(3)));
        assert_eq!(resolve(&Method::POST, "/api/campaigns/3/proofs"), Ok(Route::UploadProof(3)));
        assert_eq!(resolve(&Method::PATCH, "/api/proofs/8"), Ok(Route::UpdateProof(8)));
    }

    #[test]
    fn test_resolves_platform_routes() {
        assert_eq!(resolve(&Method::POST, "/api/auth/login"), Ok(Route::Login));
        assert_eq!(resolve(&Method::GET, "/api/users/profile"), Ok(Route::Profile));
        assert_eq!(resolve(&Method::POST, "/api/donate"), Ok(Route::QuickDonate));
        assert_eq!(resolve(&Method::GET, "/api/escrow-status"), Ok(Route::EscrowStatus));
        assert_eq!(resolve(&Method::POST, "/api/escrow/approve"), Ok(Route::EscrowApprove));
        assert_eq!(resolve(&Method::POST, "/api/escrow/release"), Ok(Route::EscrowRelease));
        assert_eq!(resolve(&Method::GET, "/api/stats"), Ok(Route::Stats));
        assert_eq!(resolve(&Method::POST, "/api/assess/allocate"), Ok(Route::AssessAllocate));
    }

    #[test]
    fn test_unknown_paths() {
        assert_eq!(resolve(&Method::GET, "/api/nothing"), Err(RouteError::NotFound));
        assert_eq!(resolve(&Method::GET, "/api/campaigns/1/other"), Err(RouteError::NotFound));
        assert_eq!(resolve(&Method::POST, "/api/assess/volcano"), Err(RouteError::NotFound));
        assert_eq!(resolve(&Method::POST, "/api/escrow/cancel"), Err(RouteError::NotFound));
    }

    #[test]
    fn test_wrong_method_lists_allowed() {
        assert_eq!(
            resolve(&Method::DELETE, "/api/campaigns"),
            Err(RouteError::MethodNotAllowed("GET, POST".into()))
        );
        assert_eq!(
            resolve(&Method::GET, "/api/campaigns/1/donate"),
            Err(RouteError::MethodNotAllowed("POST".into()))
        );
        assert_eq!(
            resolve(&Method::GET, "/api/escrow/release"),
            Err(RouteError::MethodNotAllowed("POST".into()))
        );
        // Method is checked before the id.
        assert_eq!(
            resolve(&Method::DELETE, "/api/campaigns/abc"),
            Err(RouteError::MethodNotAllowed("GET".into()))
        );
    }

    #[test]
    fn test_bad_ids() {
        assert_eq!(
            resolve(&Method::GET, "/api/campaigns/abc"),
            Err(RouteError::BadId("abc".into()))
        );
        assert_eq!(
            resolve(&Method::GET, "/api/campaigns/-1/donations"),
            Err(RouteError::BadId("-1".into()))
        );
    }
}
