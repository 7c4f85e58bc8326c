pub mod chat;
pub mod course;
pub mod matching;
pub mod user;

pub use chat::{
    ArchiveListing, ArchiveResult, ArchivedConversation, ChatRequest, ChatbotForward,
    Conversation, FallbackChatReply, HistoryQuery, HistoryResponse, SummarizeRequest,
};
pub use course::{
    AiRecommendation, CourseListing, EnrollRequest, EnrollResponse, PopularCourse,
    Recommendation, RecommendationResponse, RecommendationSource,
};
pub use matching::{
    CandidateRow, ConfidenceEntry, MatchResponse, PeerMatches, RankedMatch, SubjectConfidence,
    UpsertConfidenceRequest,
};
pub use user::{
    AuthResponse, LoginRequest, NewUser, RegisterRequest, Role, User, UserCredentials,
    UserSummary,
};
