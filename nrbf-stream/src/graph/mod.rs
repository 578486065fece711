/*!
 Contains the object graph that record streams are assembled into.

 Nodes live in an arena indexed by handle, with a side table mapping wire object ids
 to handles. Forward and backward id references resolve to the same node, so cyclic
 reference structures are representable without recursion hazards; consumers walking
 the graph track visited handles.
*/

pub mod builder;
pub mod models;
