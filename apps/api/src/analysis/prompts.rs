// Prompt constants for the résumé analysis actions and the chat loop.
// Sent verbatim; the model sees them as the last part of each request.

/// HR-style evaluation: strengths and weaknesses against the role.
pub const HR_EVALUATION_PROMPT: &str = "
You are an experienced HR with Tech Experience in the field of any one job role from Data Science, Full Stack web-development, Big Data
Engineering, DevOps, Data Analyst. Your task is to review the provided resume against the job description for these profiles.
Please share your professional evaluation on whether the candidate's profile aligns with the role.
Highlight the strengths and weaknesses of the applicant in relation to the specified job role.
";

/// ATS-style match: percentage first, then missing keywords, then final thoughts.
pub const ATS_MATCH_PROMPT: &str = "
You are a skilled ATS (Applicant Tracking System) scanner with a deep understanding in any one job role of Data Science, Full Stack web-development, Big Data
Engineering, DevOps, Data Analyst. Your task is to review the provided resume against the job description for these profiles.
Your task is to evaluate the resume against the provided job description. Give me the percentage of match if the resume matches
the job description. First the output should come as percentage and then keywords missing and last final thoughts.
";

/// Trailing instruction on every chat turn.
pub const CHAT_CONTINUATION_PROMPT: &str = "Continue the conversation.";

/// Shown instead of calling the model when an action fires before any upload.
pub const UPLOAD_REQUIRED_MESSAGE: &str = "Please upload a file";

/// Recorded as the reply when a chat message arrives before any upload.
pub const CHAT_UPLOAD_REQUIRED_MESSAGE: &str = "Please upload a resume to analyze.";

pub const RESPONSE_HEADING: &str = "The response is:";

pub const UPLOAD_SUCCESS_MESSAGE: &str = "Resume Uploaded Successfully";
